//! Schedule export as CSV, one row per group match, ordered by slot then court.

use crate::logic::schedule_by_slot;
use crate::models::{GameMatch, Tournament};
use serde::Serialize;
use std::io;

#[derive(Serialize)]
struct ScheduleRow<'a> {
    time_slot: String,
    court: String,
    player1: &'a str,
    player2: &'a str,
    /// `6-3` once completed, empty before.
    score: String,
}

fn row<'a>(tournament: &'a Tournament, m: &GameMatch) -> ScheduleRow<'a> {
    ScheduleRow {
        time_slot: m.time_slot.map(|s| s.to_string()).unwrap_or_default(),
        court: m.court_number.map(|c| c.to_string()).unwrap_or_default(),
        player1: tournament.player_name(m.player1_id),
        player2: tournament.player_name(m.player2_id),
        score: if m.completed {
            format!("{}-{}", m.player1_games, m.player2_games)
        } else {
            String::new()
        },
    }
}

/// Write the group schedule with a header row. Unscheduled matches come first.
pub fn write_schedule_csv<W: io::Write>(tournament: &Tournament, out: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for group in schedule_by_slot(&tournament.matches).values() {
        for m in group {
            writer.serialize(row(tournament, m))?;
        }
    }
    // serialize() only writes the header with the first row
    if tournament.matches.is_empty() {
        writer.write_record(["time_slot", "court", "player1", "player2", "score"])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn schedule_csv(tournament: &Tournament) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    write_schedule_csv(tournament, &mut buf)?;
    String::from_utf8(buf).map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPlayer, TimeSlot};

    fn tournament() -> Tournament {
        let mut t = Tournament::new();
        for name in ["Ana", "Bia", "Caio", "Duda"] {
            t.add_player(NewPlayer::named(name)).unwrap();
        }
        t
    }

    #[test]
    fn rows_follow_slot_then_court() {
        let mut t = tournament();
        let ids: Vec<_> = t.players.iter().map(|p| p.id).collect();
        let mut late = GameMatch::new(ids[0], ids[1]);
        late.time_slot = Some(TimeSlot::from_hm(9, 0));
        late.court_number = Some(1);
        let mut court2 = GameMatch::new(ids[2], ids[3]);
        court2.time_slot = Some(TimeSlot::from_hm(8, 0));
        court2.court_number = Some(2);
        court2.record_score(6, 4);
        let mut court1 = GameMatch::new(ids[0], ids[2]);
        court1.time_slot = Some(TimeSlot::from_hm(8, 0));
        court1.court_number = Some(1);
        t.matches = vec![late, court2, court1];

        let csv = schedule_csv(&t).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            [
                "time_slot,court,player1,player2,score",
                "08:00,1,Ana,Caio,",
                "08:00,2,Caio,Duda,6-4",
                "09:00,1,Ana,Bia,",
            ]
        );
    }

    #[test]
    fn empty_schedule_has_only_a_header() {
        let csv = schedule_csv(&tournament()).unwrap();
        assert_eq!(csv, "time_slot,court,player1,player2,score\n");
    }
}
