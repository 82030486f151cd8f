//! Cuts made of other cuts
//!
//! A [`CompositeCut`] runs an ordered list of member cuts and passes the events
//! which pass all of them. Cut sets for a given run period are composites, and
//! later run periods derive their sets from earlier ones by splicing member
//! lists at build time (see [`CompositeCut::replace_at`] and friends).

use crate::{
    cut::{Cut, CutId, Version},
    error::{CutError, Result},
    scheduling::zip_with,
    table::EventTable,
};

use log::{debug, info, log_enabled, Level};

/// Logical AND of an ordered list of cuts
#[derive(Debug)]
pub struct CompositeCut {
    id: CutId,
    members: Vec<Box<dyn Cut>>,
    debug: bool,
}
//
impl CompositeCut {
    /// Create a composite without any member yet
    pub fn new(identifier: &str, version: impl Into<Version>) -> Self {
        Self {
            id: CutId::new(identifier, version),
            members: Vec::new(),
            debug: false,
        }
    }

    /// Create a composite from a list of members
    pub fn with_members(
        identifier: &str,
        version: impl Into<Version>,
        members: Vec<Box<dyn Cut>>,
    ) -> Self {
        Self {
            members,
            ..Self::new(identifier, version)
        }
    }

    /// Attach a description
    pub fn with_doc(mut self, doc: &'static str) -> Self {
        self.id = self.id.with_doc(doc);
        self
    }

    /// Report how many events survive after each member
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Reuse the members of this composite under a new identity
    ///
    /// The version and debug setting are kept.
    ///
    pub fn into_variant(self, identifier: &str) -> Self {
        Self {
            id: CutId::new(identifier, self.id.version()).with_doc(self.id.doc()),
            ..self
        }
    }

    /// Append a member
    pub fn push(mut self, cut: impl Cut + 'static) -> Self {
        self.members.push(Box::new(cut));
        self
    }

    /// Append several members
    pub fn extend(mut self, cuts: impl IntoIterator<Item = Box<dyn Cut>>) -> Self {
        self.members.extend(cuts);
        self
    }

    /// Replace the member at some position
    pub fn replace_at(mut self, index: usize, cut: impl Cut + 'static) -> Result<Self> {
        match self.members.get_mut(index) {
            Some(slot) => *slot = Box::new(cut),
            None => return Err(self.unknown_member(format!("at index {index}"))),
        }
        Ok(self)
    }

    /// Replace the member with a given output column name
    pub fn replace(self, name: &str, cut: impl Cut + 'static) -> Result<Self> {
        let index = self.position(name)?;
        self.replace_at(index, cut)
    }

    /// Keep only the members for which a predicate holds
    pub fn retain(mut self, mut keep: impl FnMut(&dyn Cut) -> bool) -> Self {
        self.members.retain(|cut| keep(cut.as_ref()));
        self
    }

    /// Position of the member with a given output column name
    pub fn position(&self, name: &str) -> Result<usize> {
        self.members
            .iter()
            .position(|cut| cut.name() == name)
            .ok_or_else(|| self.unknown_member(format!("named {name}")))
    }

    /// Output column names of the members, in evaluation order
    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|cut| cut.name()).collect()
    }

    fn unknown_member(&self, member: String) -> CutError {
        CutError::UnknownMember {
            composite: self.id.name().to_owned(),
            member,
        }
    }
}
//
impl Cut for CompositeCut {
    fn id(&self) -> &CutId {
        &self.id
    }

    fn members(&self) -> &[Box<dyn Cut>] {
        &self.members
    }

    fn evaluate(&self, table: &mut EventTable) -> Result<()> {
        let mut pass = vec![true; table.num_rows()];
        for member in &self.members {
            member.run(table)?;
            pass = zip_with(&pass, table.bools(member.name())?, |&acc, &ok| acc && ok);

            if self.debug || log_enabled!(Level::Debug) {
                let survivors = pass.iter().filter(|&&ok| ok).count();
                let message = format!(
                    "{}: {survivors} of {} events left after {} (v{})",
                    self.id.name(),
                    pass.len(),
                    member.name(),
                    member.version(),
                );
                if self.debug {
                    info!("{message}");
                } else {
                    debug!("{message}");
                }
            }
        }
        table.insert(self.id.name(), pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{expression::ExpressionCut, range::RangeCut};

    fn table() -> EventTable {
        EventTable::from_columns([
            ("cs1", vec![-1., 50., 150., 250., 100.]),
            ("s2", vec![300., 100., 200., 400., 160.]),
        ])
        .unwrap()
    }

    fn members() -> CompositeCut {
        CompositeCut::new("AllEnergy", "test")
            .push(RangeCut::new("A", 0).variable("cs1").allowed_range(0., 200.))
            .push(ExpressionCut::new("B", 0, "150 < s2").unwrap())
    }

    #[test]
    fn conjunction_of_members() {
        let mut table = table();
        members().run(&mut table).unwrap();
        assert_eq!(
            table.bools("CutA").unwrap(),
            &[false, true, true, false, true]
        );
        assert_eq!(table.bools("CutB").unwrap(), &[true, false, true, true, true]);
        assert_eq!(
            table.bools("CutAllEnergy").unwrap(),
            &[false, false, true, false, true]
        );
        assert_eq!(table.num_rows(), 5);
    }

    #[test]
    fn empty_composite_passes_everything() {
        let mut table = table();
        CompositeCut::new("Nothing", 0).run(&mut table).unwrap();
        assert_eq!(table.bools("CutNothing").unwrap(), &[true; 5]);
    }

    #[test]
    fn nested_composites() {
        let mut table = table();
        let outer = CompositeCut::new("Outer", 0)
            .push(members().with_debug(true))
            .push(ExpressionCut::new("C", 0, "cs1 < 120").unwrap());
        outer.run(&mut table).unwrap();
        assert_eq!(
            table.bools("CutOuter").unwrap(),
            &[false, false, false, false, true]
        );
        assert_eq!(outer.members()[0].members().len(), 2);
    }

    #[test]
    fn splicing() {
        let base = members().push(ExpressionCut::new("C", 0, "cs1 < 120").unwrap());
        assert_eq!(base.member_names(), ["CutA", "CutB", "CutC"]);

        let variant = base
            .into_variant("LowEnergy")
            .replace_at(1, ExpressionCut::new("B", 1, "180 < s2").unwrap())
            .unwrap()
            .push(ExpressionCut::new("D", 0, "cs1 > 0").unwrap());
        assert_eq!(variant.name(), "CutLowEnergy");
        assert_eq!(variant.member_names(), ["CutA", "CutB", "CutC", "CutD"]);
        assert_eq!(variant.members()[1].version(), Version::Integer(1));

        let variant = variant
            .replace("CutC", ExpressionCut::new("C", 2, "cs1 < 160").unwrap())
            .unwrap()
            .retain(|cut| cut.name() != "CutD");
        assert_eq!(variant.member_names(), ["CutA", "CutB", "CutC"]);
        assert_eq!(variant.position("CutC").unwrap(), 2);
    }

    #[test]
    fn splicing_errors() {
        assert!(matches!(
            members().replace_at(7, ExpressionCut::new("X", 0, "True").unwrap()),
            Err(CutError::UnknownMember { .. })
        ));
        assert!(matches!(
            members().replace("CutZ", ExpressionCut::new("X", 0, "True").unwrap()),
            Err(CutError::UnknownMember { ref member, .. }) if member == "named CutZ"
        ));
    }

    #[test]
    fn failing_member_aborts() {
        let mut table = table();
        let cut = members().push(ExpressionCut::new("E", 0, "missing > 0").unwrap());
        assert!(cut.run(&mut table).is_err());
        assert!(!table.contains("CutAllEnergy"));
    }
}
