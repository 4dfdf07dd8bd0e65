//! Text output for tickets, trains and seat maps
//!
//! This module centralizes how the front end renders core data:
//! - Ticket listings as CSV (`ticket_id,train_id,row,col`)
//! - Seat maps as rows of `0` (free) and `1` (booked)
//! - One-line train schedules
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::types::{OccupancyState, Ticket, Train};
use std::io::Write;

/// Write tickets in CSV format, in booking order
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_tickets_csv(tickets: &[Ticket], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["ticket_id", "train_id", "row", "col"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for ticket in tickets {
        writer
            .write_record(&[
                ticket.ticket_id.clone(),
                ticket.train_id.clone(),
                ticket.row.to_string(),
                ticket.col.to_string(),
            ])
            .map_err(|e| format!("Failed to write ticket record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

/// Render seat rows as space-separated digits, one line per row
pub fn format_seat_map(rows: &[Vec<OccupancyState>]) -> String {
    let mut out = String::new();
    for row in rows {
        let line: Vec<String> = row.iter().map(|s| s.as_digit().to_string()).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

/// Render a train as `T1: A 08:00 -> B 09:00 (3/4 seats free)`
pub fn format_train(train: &Train) -> String {
    let route: Vec<String> = train
        .stops
        .iter()
        .map(|stop| format!("{} {}", stop.station, stop.time))
        .collect();
    format!(
        "{}: {} ({}/{} seats free)",
        train.train_id,
        route.join(" -> "),
        train.seats.free_count(),
        train.seats.rows() * train.seats.cols()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SeatGrid, Stop};
    use rstest::rstest;

    fn ticket(id: &str, train: &str, row: usize, col: usize) -> Ticket {
        Ticket {
            ticket_id: id.to_string(),
            train_id: train.to_string(),
            row,
            col,
        }
    }

    #[rstest]
    #[case::empty(vec![], "ticket_id,train_id,row,col\n")]
    #[case::single(
        vec![ticket("t-1", "T1", 0, 1)],
        "ticket_id,train_id,row,col\nt-1,T1,0,1\n"
    )]
    #[case::keeps_booking_order(
        vec![ticket("t-2", "T2", 3, 0), ticket("t-1", "T1", 0, 0)],
        "ticket_id,train_id,row,col\nt-2,T2,3,0\nt-1,T1,0,0\n"
    )]
    fn test_write_tickets_csv(#[case] tickets: Vec<Ticket>, #[case] expected_output: &str) {
        let mut output = Vec::new();
        let result = write_tickets_csv(&tickets, &mut output);
        assert!(result.is_ok());

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(output_str, expected_output);
    }

    #[test]
    fn test_format_seat_map() {
        let mut grid = SeatGrid::new(2, 3);
        grid.try_occupy(0, 1).unwrap();

        assert_eq!(format_seat_map(&grid.snapshot()), "0 1 0\n0 0 0\n");
        assert_eq!(format_seat_map(&[]), "");
    }

    #[test]
    fn test_format_train() {
        let mut train = Train::new(
            "T1",
            vec![Stop::new("A", "08:00"), Stop::new("B", "09:00")],
            SeatGrid::new(2, 2),
        );
        train.seats.try_occupy(1, 1).unwrap();

        assert_eq!(
            format_train(&train),
            "T1: A 08:00 -> B 09:00 (3/4 seats free)"
        );
    }
}
