//! The allocation core: reservation-group scoring, capacity partitioning, and
//! the manifest uniqueness guard.
//!
//! Everything in this module is pure and synchronous. Callers run it to
//! completion in memory and only then talk to storage, so a rejected batch
//! never produces a partial write.

use std::collections::{BTreeSet, HashMap, HashSet};

use thiserror::Error;

use crate::models::{FlightCategory, Passenger};

const CONNECTION_WEIGHT: i64 = 3;
const CHECKED_BAGGAGE_WEIGHT: i64 = 2;
const AGE_WEIGHT: i64 = 1;

/// The result of partitioning a candidate passenger list against capacity.
///
/// Every input passenger lands in exactly one of the two lists, and members of
/// one reservation group always land in the same list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    pub seated: Vec<Passenger>,
    pub overbooked: Vec<Passenger>,
}

/// A batch of passenger writes collides on identifiers: either the batch
/// repeats an identifier internally, or it reuses one already on the flight.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate passenger ids: {ids:?}")]
pub struct DuplicatePassengerError {
    /// The offending identifiers, sorted ascending.
    pub ids: Vec<i64>,
}

/// All passengers sharing one reservation identifier, in input order.
struct ReservationGroup {
    members: Vec<Passenger>,
    score: i64,
}

impl ReservationGroup {
    fn average_score(&self) -> f64 {
        self.score as f64 / self.members.len() as f64
    }
}

fn tier_weight(category: FlightCategory) -> i64 {
    match category {
        FlightCategory::Black => 10,
        FlightCategory::Platinum => 7,
        FlightCategory::Gold => 5,
        FlightCategory::Normal => 2,
    }
}

/// Priority weight of a single passenger.
pub fn passenger_weight(passenger: &Passenger) -> i64 {
    let mut weight = tier_weight(passenger.flight_category);
    if passenger.has_connections {
        weight += CONNECTION_WEIGHT;
    }
    if passenger.has_checked_baggage {
        weight += CHECKED_BAGGAGE_WEIGHT;
    }
    weight + AGE_WEIGHT * i64::from(passenger.age)
}

/// Group passengers by reservation identifier, preserving both the order in
/// which groups first appear and each group's internal member order.
fn group_by_reservation(passengers: Vec<Passenger>) -> Vec<ReservationGroup> {
    let mut groups: Vec<ReservationGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for passenger in passengers {
        let weight = passenger_weight(&passenger);
        match index.get(&passenger.reservation_id) {
            Some(&i) => {
                groups[i].members.push(passenger);
                groups[i].score += weight;
            }
            None => {
                index.insert(passenger.reservation_id.clone(), groups.len());
                groups.push(ReservationGroup {
                    members: vec![passenger],
                    score: weight,
                });
            }
        }
    }

    groups
}

/// Partition a candidate passenger list into seated and overbooked sets.
///
/// Groups are ranked by descending average score, ties broken by descending
/// group size, remaining ties by first appearance in the input. The ranked
/// groups are then walked in order: a group is seated whole if it fits the
/// remaining capacity, otherwise it is overbooked whole. A rejected group does
/// not end the walk; later groups that still fit are admitted.
pub fn allocate(passengers: Vec<Passenger>, capacity: usize) -> Allocation {
    let mut groups = group_by_reservation(passengers);

    // Stable sort: equal (average, size) keeps first-appearance order.
    groups.sort_by(|a, b| {
        b.average_score()
            .total_cmp(&a.average_score())
            .then_with(|| b.members.len().cmp(&a.members.len()))
    });

    let mut allocation = Allocation::default();
    let mut seated_count = 0usize;
    for group in groups {
        if seated_count + group.members.len() <= capacity {
            seated_count += group.members.len();
            allocation.seated.extend(group.members);
        } else {
            allocation.overbooked.extend(group.members);
        }
    }

    allocation
}

/// Reject a batch of incoming passengers that would break manifest uniqueness.
///
/// Fails if the batch repeats an identifier internally or if any incoming
/// identifier is already in `existing`. The error carries the full offending
/// identifier set. Succeeds with no result value otherwise; this must run
/// before the corresponding storage write.
pub fn check_unique(
    existing: &HashSet<i64>,
    incoming: &[Passenger],
) -> Result<(), DuplicatePassengerError> {
    let mut seen: HashSet<i64> = HashSet::new();
    let mut offending: BTreeSet<i64> = BTreeSet::new();

    for passenger in incoming {
        if !seen.insert(passenger.id) {
            offending.insert(passenger.id);
        }
        if existing.contains(&passenger.id) {
            offending.insert(passenger.id);
        }
    }

    if offending.is_empty() {
        Ok(())
    } else {
        Err(DuplicatePassengerError {
            ids: offending.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passenger(id: i64, reservation_id: &str, category: FlightCategory, age: u32) -> Passenger {
        Passenger {
            id,
            name: format!("Passenger {id}"),
            has_connections: false,
            age,
            flight_category: category,
            reservation_id: reservation_id.to_string(),
            has_checked_baggage: false,
        }
    }

    fn ids(passengers: &[Passenger]) -> Vec<i64> {
        passengers.iter().map(|p| p.id).collect()
    }

    #[test]
    fn weight_sums_tier_connections_baggage_and_age() {
        let mut p = passenger(1, "R1", FlightCategory::Black, 5);
        p.has_connections = true;
        p.has_checked_baggage = true;
        // 10 + 3 + 2 + 5
        assert_eq!(passenger_weight(&p), 20);

        let plain = passenger(2, "R1", FlightCategory::Normal, 0);
        assert_eq!(passenger_weight(&plain), 2);
    }

    #[test]
    fn tier_weights_are_ordered() {
        assert_eq!(tier_weight(FlightCategory::Black), 10);
        assert_eq!(tier_weight(FlightCategory::Platinum), 7);
        assert_eq!(tier_weight(FlightCategory::Gold), 5);
        assert_eq!(tier_weight(FlightCategory::Normal), 2);
    }

    #[test]
    fn empty_input_yields_empty_lists() {
        let allocation = allocate(vec![], 10);
        assert!(allocation.seated.is_empty());
        assert!(allocation.overbooked.is_empty());
    }

    #[test]
    fn seats_highest_scoring_singles_first() {
        // Weights 20, 15, 5.
        let mut a = passenger(1, "A", FlightCategory::Black, 5);
        a.has_connections = true;
        a.has_checked_baggage = true;
        let mut b = passenger(2, "B", FlightCategory::Platinum, 5);
        b.has_connections = true;
        let c = passenger(3, "C", FlightCategory::Normal, 3);

        let allocation = allocate(vec![c, a, b], 2);
        assert_eq!(ids(&allocation.seated), vec![1, 2]);
        assert_eq!(ids(&allocation.overbooked), vec![3]);
    }

    #[test]
    fn small_high_average_group_outranks_larger_party() {
        // Group A: two passengers averaging 8 (2 + 3 + 3 each).
        let mut a1 = passenger(1, "A", FlightCategory::Normal, 3);
        a1.has_connections = true;
        let mut a2 = passenger(2, "A", FlightCategory::Normal, 3);
        a2.has_connections = true;
        // Group B: one passenger scoring 12 (10 + 2).
        let mut b = passenger(3, "B", FlightCategory::Black, 0);
        b.has_checked_baggage = true;

        let allocation = allocate(vec![a1, a2, b], 3);
        // B ranks first, takes one seat; A still fits in the remaining two.
        assert_eq!(ids(&allocation.seated), vec![3, 1, 2]);
        assert!(allocation.overbooked.is_empty());
    }

    #[test]
    fn group_larger_than_capacity_is_fully_overbooked() {
        let a1 = passenger(1, "A", FlightCategory::Gold, 30);
        let a2 = passenger(2, "A", FlightCategory::Gold, 30);

        let allocation = allocate(vec![a1, a2], 1);
        assert!(allocation.seated.is_empty());
        assert_eq!(ids(&allocation.overbooked), vec![1, 2]);
    }

    #[test]
    fn average_ties_are_broken_by_group_size() {
        // Everyone weighs 6 (2 + 4), so group averages tie and the trio wins.
        let x = passenger(1, "X", FlightCategory::Normal, 4);
        let y1 = passenger(2, "Y", FlightCategory::Normal, 4);
        let y2 = passenger(3, "Y", FlightCategory::Normal, 4);
        let y3 = passenger(4, "Y", FlightCategory::Normal, 4);

        let allocation = allocate(vec![x, y1, y2, y3], 3);
        assert_eq!(ids(&allocation.seated), vec![2, 3, 4]);
        assert_eq!(ids(&allocation.overbooked), vec![1]);
    }

    #[test]
    fn full_ties_preserve_first_appearance_order() {
        let a = passenger(1, "A", FlightCategory::Normal, 4);
        let b = passenger(2, "B", FlightCategory::Normal, 4);
        let c = passenger(3, "C", FlightCategory::Normal, 4);

        let allocation = allocate(vec![a, b, c], 2);
        assert_eq!(ids(&allocation.seated), vec![1, 2]);
        assert_eq!(ids(&allocation.overbooked), vec![3]);
    }

    #[test]
    fn rejection_does_not_end_admission() {
        // Ranked: single weight 20, pair averaging 10, single weight 4.
        let mut top = passenger(1, "A", FlightCategory::Black, 5);
        top.has_connections = true;
        top.has_checked_baggage = true;
        let b1 = passenger(2, "B", FlightCategory::Normal, 8);
        let b2 = passenger(3, "B", FlightCategory::Normal, 8);
        let low = passenger(4, "C", FlightCategory::Normal, 2);

        let allocation = allocate(vec![top, b1, b2, low], 2);
        // The pair is rejected (1 + 2 > 2) but the low single still fits.
        assert_eq!(ids(&allocation.seated), vec![1, 4]);
        assert_eq!(ids(&allocation.overbooked), vec![2, 3]);
    }

    #[test]
    fn every_passenger_lands_in_exactly_one_list() {
        let passengers: Vec<Passenger> = (0..20)
            .map(|i| {
                passenger(
                    i,
                    &format!("R{}", i % 7),
                    FlightCategory::Normal,
                    (i as u32) % 60,
                )
            })
            .collect();

        let allocation = allocate(passengers.clone(), 11);
        let mut all: Vec<i64> = ids(&allocation.seated);
        all.extend(ids(&allocation.overbooked));
        all.sort_unstable();
        let mut expected: Vec<i64> = passengers.iter().map(|p| p.id).collect();
        expected.sort_unstable();
        assert_eq!(all, expected);
        assert!(allocation.seated.len() <= 11);
    }

    #[test]
    fn groups_are_never_split() {
        let passengers: Vec<Passenger> = (0..12)
            .map(|i| passenger(i, &format!("R{}", i % 4), FlightCategory::Gold, i as u32))
            .collect();

        let allocation = allocate(passengers, 7);
        for list in [&allocation.seated, &allocation.overbooked] {
            let reservations: HashSet<&str> =
                list.iter().map(|p| p.reservation_id.as_str()).collect();
            for reservation in reservations {
                let here = list
                    .iter()
                    .filter(|p| p.reservation_id == reservation)
                    .count();
                assert_eq!(here, 3, "group {reservation} was split");
            }
        }
    }

    #[test]
    fn allocation_is_deterministic() {
        let passengers: Vec<Passenger> = (0..15)
            .map(|i| {
                passenger(
                    i,
                    &format!("R{}", i % 5),
                    FlightCategory::Platinum,
                    (i as u32) * 2,
                )
            })
            .collect();

        let first = allocate(passengers.clone(), 9);
        let second = allocate(passengers, 9);
        assert_eq!(first, second);
    }

    #[test]
    fn check_unique_accepts_disjoint_batch() {
        let existing: HashSet<i64> = [1, 2, 3].into_iter().collect();
        let incoming = vec![
            passenger(4, "A", FlightCategory::Normal, 20),
            passenger(5, "A", FlightCategory::Normal, 21),
        ];
        assert!(check_unique(&existing, &incoming).is_ok());
    }

    #[test]
    fn check_unique_rejects_internal_duplicates() {
        let incoming = vec![
            passenger(7, "A", FlightCategory::Normal, 20),
            passenger(7, "B", FlightCategory::Normal, 30),
        ];
        let err = check_unique(&HashSet::new(), &incoming).unwrap_err();
        assert_eq!(err.ids, vec![7]);
    }

    #[test]
    fn check_unique_rejects_collisions_with_existing_ids() {
        let existing: HashSet<i64> = [1, 9].into_iter().collect();
        let incoming = vec![
            passenger(9, "A", FlightCategory::Normal, 20),
            passenger(10, "A", FlightCategory::Normal, 20),
            passenger(1, "B", FlightCategory::Normal, 20),
        ];
        let err = check_unique(&existing, &incoming).unwrap_err();
        assert_eq!(err.ids, vec![1, 9]);
    }
}
