//! Train-related types for the train booking engine
//!
//! A train is an ordered list of stops (the order defines the direction of
//! travel) plus the seat grid that booking operates on.

use super::seat::SeatGrid;
use serde::{Deserialize, Serialize};

/// Train identifier
pub type TrainId = String;

/// One scheduled stop of a train
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    /// Station name, matched exactly (case-sensitive)
    pub station: String,

    /// Arrival time as shown to the user (e.g. "08:15")
    pub time: String,
}

impl Stop {
    pub fn new(station: impl Into<String>, time: impl Into<String>) -> Self {
        Stop {
            station: station.into(),
            time: time.into(),
        }
    }
}

/// A scheduled train with its seat inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Train {
    /// Unique train identifier
    pub train_id: TrainId,

    /// Stops in travel order
    pub stops: Vec<Stop>,

    /// Seat occupancy for this train
    pub seats: SeatGrid,
}

impl Train {
    /// Create a train with the given stops and seat grid
    pub fn new(train_id: impl Into<TrainId>, stops: Vec<Stop>, seats: SeatGrid) -> Self {
        Train {
            train_id: train_id.into(),
            stops,
            seats,
        }
    }

    /// Position of a station in the stop order, if the train calls there
    pub fn station_index(&self, station: &str) -> Option<usize> {
        self.stops.iter().position(|stop| stop.station == station)
    }

    /// Whether this train travels from `source` to `destination`
    ///
    /// Both stations must be on the route and `source` must come strictly
    /// before `destination`.
    pub fn serves(&self, source: &str, destination: &str) -> bool {
        match (self.station_index(source), self.station_index(destination)) {
            (Some(from), Some(to)) => from < to,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn abc_train() -> Train {
        Train::new(
            "T1",
            vec![
                Stop::new("A", "08:00"),
                Stop::new("B", "09:00"),
                Stop::new("C", "10:00"),
            ],
            SeatGrid::new(2, 2),
        )
    }

    #[rstest]
    #[case::forward("A", "C", true)]
    #[case::adjacent("B", "C", true)]
    #[case::reverse("C", "A", false)]
    #[case::same_station("B", "B", false)]
    #[case::unknown_source("X", "C", false)]
    #[case::unknown_destination("A", "X", false)]
    #[case::case_sensitive("a", "c", false)]
    fn test_serves(#[case] source: &str, #[case] destination: &str, #[case] expected: bool) {
        assert_eq!(abc_train().serves(source, destination), expected);
    }

    #[test]
    fn test_persisted_shape() {
        let train = abc_train();
        let value = serde_json::to_value(&train).unwrap();

        assert_eq!(value["trainId"], "T1");
        assert_eq!(value["stops"][1]["station"], "B");
        assert_eq!(value["stops"][1]["time"], "09:00");
        assert_eq!(value["seats"], serde_json::json!([[0, 0], [0, 0]]));
    }
}
