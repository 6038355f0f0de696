//! Interactive street picker.
//!
//! [`StreetSelection`] holds the state and decides what each input line
//! means; [`select_streets`] runs it against a [`Console`] and prints the
//! operator-facing messages for every [`Transition`].
//!
//! Two empty lines in a row commit. The session starts as if a recap had
//! just been shown, so an immediate Enter takes the whole precinct. Any
//! integer input, valid street or not, clears that state; non-numeric
//! input leaves it alone.

use std::io::{BufRead, Write};
use std::num::IntErrorKind;

use crate::console::Console;
use crate::error::RosterError;
use crate::model::StreetKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingInput,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidInput {
    NotANumber,
    /// Zero, or a magnitude past the last candidate.
    NoSuchStreet,
}

/// Effect of one input line. Indices are 1-based, as shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Added(usize),
    Removed(usize),
    AlreadySelected(usize),
    AlreadyDeselected(usize),
    Recap,
    Invalid(InvalidInput),
    Commit,
}

#[derive(Debug, Clone)]
pub struct StreetSelection {
    entries: Vec<(StreetKey, bool)>,
    recapped: bool,
    phase: Phase,
}

impl StreetSelection {
    /// Candidates are kept in the order given.
    pub fn new(candidates: Vec<StreetKey>) -> Self {
        Self {
            entries: candidates.into_iter().map(|street| (street, false)).collect(),
            recapped: true,
            phase: Phase::Idle,
        }
    }

    /// Called once the listing and instructions have been shown.
    pub fn begin(&mut self) {
        if self.phase == Phase::Idle {
            self.phase = Phase::AwaitingInput;
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 1-based lookup.
    pub fn street(&self, index: usize) -> Option<&StreetKey> {
        index.checked_sub(1).and_then(|i| self.entries.get(i)).map(|(street, _)| street)
    }

    /// Selected candidates with their 1-based indices, in candidate order.
    pub fn selected(&self) -> impl Iterator<Item = (usize, &StreetKey)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, (_, on))| *on)
            .map(|(i, (street, _))| (i + 1, street))
    }

    pub fn apply(&mut self, line: &str) -> Transition {
        self.begin();
        if self.phase == Phase::Finished {
            return Transition::Commit;
        }

        let line = line.trim();
        if line.is_empty() {
            if self.recapped {
                self.phase = Phase::Finished;
                return Transition::Commit;
            }
            self.recapped = true;
            return Transition::Recap;
        }

        // Any integer, even one naming no street, clears the recap flag.
        let requested: i64 = match line.parse() {
            Ok(n) => n,
            Err(err) => match err.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    self.recapped = false;
                    return Transition::Invalid(InvalidInput::NoSuchStreet);
                }
                _ => return Transition::Invalid(InvalidInput::NotANumber),
            },
        };
        self.recapped = false;

        let index = requested.unsigned_abs();
        if index == 0 || index > self.entries.len() as u64 {
            return Transition::Invalid(InvalidInput::NoSuchStreet);
        }
        let index = index as usize;

        let flag = &mut self.entries[index - 1].1;
        match (requested > 0, *flag) {
            (true, false) => {
                *flag = true;
                Transition::Added(index)
            }
            (true, true) => Transition::AlreadySelected(index),
            (false, true) => {
                *flag = false;
                Transition::Removed(index)
            }
            (false, false) => Transition::AlreadyDeselected(index),
        }
    }

    /// The selected streets, or every candidate when nothing is selected.
    pub fn finish(self) -> Vec<StreetKey> {
        let nothing_selected = self.entries.iter().all(|(_, on)| !on);
        self.entries
            .into_iter()
            .filter(|(_, on)| nothing_selected || *on)
            .map(|(street, _)| street)
            .collect()
    }
}

/// One numbered line of the candidate listing, raw street parts aligned.
pub fn listing_line(index: usize, street: &StreetKey) -> String {
    format!("{:3}.  {:>2}  {}  {}", index, street.prefix, street.name, street.suffix)
}

/// Run the picker on `console` until the operator commits.
/// Closed input commits whatever is selected so far.
pub fn select_streets<R: BufRead, W: Write>(
    candidates: Vec<StreetKey>,
    console: &mut Console<R, W>,
) -> Result<Vec<StreetKey>, RosterError> {
    let mut selection = StreetSelection::new(candidates);

    console.say(format_args!(
        "We found {} streets in this precinct. Here they are:",
        selection.len()
    ))?;
    for (i, (street, _)) in selection.entries.iter().enumerate() {
        console.say(listing_line(i + 1, street))?;
    }
    console.say("Which ones do you want to use? Input a number to add it,")?;
    console.say("its negative to remove it, and nothing to check what you have selected.")?;
    console.say("Or, press Enter immediately to use the entire precinct.")?;
    selection.begin();

    loop {
        let Some(line) = console.read_line()? else {
            tracing::debug!("input closed during street selection");
            break;
        };
        let transition = selection.apply(&line);
        tracing::trace!(?transition, "street selection");

        match transition {
            Transition::Commit => break,
            Transition::Added(k) => {
                if let Some(street) = selection.street(k) {
                    console.say(format_args!("Added {k}. {street}."))?;
                }
            }
            Transition::Removed(k) => {
                if let Some(street) = selection.street(k) {
                    console.say(format_args!("Removed {k}. {street}."))?;
                }
            }
            Transition::AlreadySelected(_) => console.say("That street is already selected.")?,
            Transition::AlreadyDeselected(_) => console.say("That street is already deselected.")?,
            Transition::Invalid(InvalidInput::NoSuchStreet) => {
                console.say("That street doesn't exist.")?
            }
            Transition::Invalid(InvalidInput::NotANumber) => {
                console.say("I don't know what that is, but it's not a number.")?
            }
            Transition::Recap => {
                console.say("You've selected these streets:")?;
                let lines: Vec<String> = selection
                    .selected()
                    .map(|(k, street)| listing_line(k, street))
                    .collect();
                if lines.is_empty() {
                    console.say("      FULL PRECINCT (none currently selected)")?;
                }
                for line in lines {
                    console.say(line)?;
                }
                console.say("Press Enter again to use these streets.")?;
            }
        }
    }

    console.say("All right, we'll use those streets.")?;
    let chosen = selection.selected().count();
    if chosen == 0 {
        console.say("You selected no streets, so we'll use the whole precinct.")?;
    }
    let streets = selection.finish();
    tracing::info!(chosen, using = streets.len(), "street selection committed");
    Ok(streets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn abc() -> Vec<StreetKey> {
        vec![
            StreetKey::new("", "ASH", "ST"),
            StreetKey::new("N", "BIRCH", "AVE"),
            StreetKey::new("", "CEDAR", "LN"),
        ]
    }

    fn run(lines: &[&str]) -> (Vec<StreetKey>, String) {
        let input = lines.iter().map(|l| format!("{l}\n")).collect::<String>();
        let mut console = Console::new(Cursor::new(input.into_bytes()), Vec::new());
        let streets = select_streets(abc(), &mut console).unwrap();
        (streets, String::from_utf8(console.into_output()).unwrap())
    }

    #[test]
    fn toggle_on_then_off_falls_back_to_whole_precinct() {
        let (streets, out) = run(&["1", "-1", "", ""]);
        assert_eq!(streets, abc());
        assert!(out.contains("Added 1. Ash St."));
        assert!(out.contains("Removed 1. Ash St."));
        assert!(out.contains("FULL PRECINCT (none currently selected)"));
        assert!(out.contains("You selected no streets, so we'll use the whole precinct."));
    }

    #[test]
    fn whitespace_line_counts_as_empty() {
        let (streets, out) = run(&["2", "", " "]);
        assert_eq!(streets, vec![StreetKey::new("N", "BIRCH", "AVE")]);
        assert!(out.contains("  2.   N  BIRCH  AVE"));
        assert!(!out.contains("You selected no streets"));
    }

    #[test]
    fn immediate_enter_takes_everything() {
        let (streets, out) = run(&[""]);
        assert_eq!(streets, abc());
        assert!(!out.contains("You've selected these streets:"));
    }

    #[test]
    fn closed_input_commits_current_selection() {
        let (streets, _) = run(&["3"]);
        assert_eq!(streets, vec![StreetKey::new("", "CEDAR", "LN")]);
    }

    #[test]
    fn result_keeps_candidate_order() {
        let (streets, _) = run(&["3", "1", "", ""]);
        assert_eq!(streets, vec![abc()[0].clone(), abc()[2].clone()]);
    }

    #[test]
    fn invalid_inputs_leave_selection_alone() {
        let mut sel = StreetSelection::new(abc());
        assert_eq!(sel.phase(), Phase::Idle);
        assert_eq!(sel.apply("2"), Transition::Added(2));
        assert_eq!(sel.phase(), Phase::AwaitingInput);
        assert_eq!(sel.apply("0"), Transition::Invalid(InvalidInput::NoSuchStreet));
        assert_eq!(sel.apply("4"), Transition::Invalid(InvalidInput::NoSuchStreet));
        assert_eq!(sel.apply("-4"), Transition::Invalid(InvalidInput::NoSuchStreet));
        assert_eq!(
            sel.apply("99999999999999999999999"),
            Transition::Invalid(InvalidInput::NoSuchStreet)
        );
        assert_eq!(sel.apply("oak"), Transition::Invalid(InvalidInput::NotANumber));
        assert_eq!(sel.apply("1.5"), Transition::Invalid(InvalidInput::NotANumber));
        assert_eq!(sel.selected().map(|(k, _)| k).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn repeated_toggles_are_reported_not_errors() {
        let mut sel = StreetSelection::new(abc());
        assert_eq!(sel.apply("-1"), Transition::AlreadyDeselected(1));
        assert_eq!(sel.apply("1"), Transition::Added(1));
        assert_eq!(sel.apply("1"), Transition::AlreadySelected(1));
        assert_eq!(sel.apply("-1"), Transition::Removed(1));
    }

    #[test]
    fn recap_then_enter_commits() {
        let mut sel = StreetSelection::new(abc());
        assert_eq!(sel.apply("1"), Transition::Added(1));
        assert_eq!(sel.apply(""), Transition::Recap);
        assert_eq!(sel.apply("2"), Transition::Added(2));
        assert_eq!(sel.apply(""), Transition::Recap);
        assert_eq!(sel.apply(""), Transition::Commit);
        assert_eq!(sel.phase(), Phase::Finished);
        assert_eq!(sel.finish().len(), 2);
    }

    #[test]
    fn out_of_range_number_after_recap_needs_a_fresh_recap() {
        let mut sel = StreetSelection::new(abc());
        assert_eq!(sel.apply("1"), Transition::Added(1));
        assert_eq!(sel.apply(""), Transition::Recap);
        assert_eq!(sel.apply("0"), Transition::Invalid(InvalidInput::NoSuchStreet));
        assert_eq!(sel.apply(""), Transition::Recap);

        assert_eq!(sel.apply("-9"), Transition::Invalid(InvalidInput::NoSuchStreet));
        assert_eq!(sel.apply(""), Transition::Recap);

        assert_eq!(
            sel.apply("99999999999999999999999"),
            Transition::Invalid(InvalidInput::NoSuchStreet)
        );
        assert_eq!(sel.apply(""), Transition::Recap);
        assert_eq!(sel.apply(""), Transition::Commit);
    }

    #[test]
    fn non_number_after_recap_keeps_enter_committing() {
        let mut sel = StreetSelection::new(abc());
        assert_eq!(sel.apply("2"), Transition::Added(2));
        assert_eq!(sel.apply(""), Transition::Recap);
        assert_eq!(sel.apply("oak"), Transition::Invalid(InvalidInput::NotANumber));
        assert_eq!(sel.apply(""), Transition::Commit);
    }

    #[test]
    fn immediate_out_of_range_number_then_enter_recaps() {
        let (streets, out) = run(&["4", "", ""]);
        assert_eq!(streets, abc());
        assert!(out.contains("That street doesn't exist."));
        assert!(out.contains("You've selected these streets:"));
    }

    #[test]
    fn listing_line_layout() {
        assert_eq!(listing_line(7, &StreetKey::new("W", "34TH", "ST")), "  7.   W  34TH  ST");
        assert_eq!(listing_line(12, &StreetKey::new("", "MAIN", "")), " 12.      MAIN  ");
    }
}
