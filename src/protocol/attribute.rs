//! Attribute descriptors and the per-model attribute table.
//!
//! A [`Descriptor`] captures everything the codec needs for one named
//! attribute: the kinds of its positional slots and the write/read command
//! templates. Arity is derived from the slot kinds alone:
//!
//! - write consumes one argument per kind;
//! - read consumes all but the last kind, the last kind being the type of the reply.
use std::collections::{BTreeMap, HashMap};

use super::template::{Template, TemplateError};
use crate::Kind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    kinds: &'static [Kind],
    write: Option<&'static str>,
    read: Option<&'static str>,
}

impl Descriptor {
    pub const fn new(
        kinds: &'static [Kind],
        write: Option<&'static str>,
        read: Option<&'static str>,
    ) -> Self {
        Self { kinds, write, read }
    }

    /// Attribute that can be both written and read.
    pub const fn read_write(kinds: &'static [Kind], write: &'static str, read: &'static str) -> Self {
        Self::new(kinds, Some(write), Some(read))
    }

    pub const fn read_only(kinds: &'static [Kind], read: &'static str) -> Self {
        Self::new(kinds, None, Some(read))
    }

    pub const fn write_only(kinds: &'static [Kind], write: &'static str) -> Self {
        Self::new(kinds, Some(write), None)
    }

    pub fn kinds(&self) -> &'static [Kind] {
        self.kinds
    }

    pub fn write_template(&self) -> Option<&'static str> {
        self.write
    }

    pub fn read_template(&self) -> Option<&'static str> {
        self.read
    }

    pub fn write_arity(&self) -> usize {
        self.kinds.len()
    }

    pub fn read_arity(&self) -> usize {
        self.kinds.len().saturating_sub(1)
    }

    /// Kind of the value the device returns on read.
    pub fn result_kind(&self) -> Option<Kind> {
        self.kinds.last().copied()
    }
}

/// Invariant violation found by [`AttributeTable::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableProblem {
    NoKinds(&'static str),
    NoTemplates(&'static str),
    Template(&'static str, TemplateError),
    Placeholders {
        attribute: &'static str,
        template: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Immutable mapping from attribute name to [`Descriptor`].
#[derive(Debug, Clone, Default)]
pub struct AttributeTable {
    entries: HashMap<&'static str, Descriptor>,
}

impl AttributeTable {
    pub fn from_entries(entries: &[(&'static str, Descriptor)]) -> Self {
        Self {
            entries: entries.iter().copied().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Descriptor> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Descriptor)> {
        self.entries
            .iter()
            .map(|(name, desc)| (*name, desc))
            .collect::<BTreeMap<_, _>>()
            .into_iter()
    }

    /// Checks every descriptor against the table invariants: at least one
    /// kind, at least one template, and placeholder counts that agree with
    /// the derived write/read arity.
    pub fn validate(&self) -> Vec<TableProblem> {
        let mut problems = Vec::new();

        for (name, desc) in self.iter() {
            if desc.kinds.is_empty() {
                problems.push(TableProblem::NoKinds(name));
            }
            if desc.write.is_none() && desc.read.is_none() {
                problems.push(TableProblem::NoTemplates(name));
            }

            let templates = [
                (desc.write, desc.write_arity()),
                (desc.read, desc.read_arity()),
            ];
            for (source, expected) in templates {
                let Some(source) = source else { continue };
                match Template::parse(source) {
                    Ok(t) if t.placeholders() != expected => {
                        problems.push(TableProblem::Placeholders {
                            attribute: name,
                            template: source,
                            expected,
                            found: t.placeholders(),
                        })
                    }
                    Ok(_) => {}
                    Err(e) => problems.push(TableProblem::Template(name, e)),
                }
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOAT: &[Kind] = &[Kind::Float];
    const ROW: &[Kind] = &[Kind::Integer, Kind::Float];

    #[test]
    fn arity_is_derived_from_kinds() {
        let d = Descriptor::read_write(ROW, "@{}a{:.3f}", "@{}a?");
        assert_eq!(d.write_arity(), 2);
        assert_eq!(d.read_arity(), 1);
        assert_eq!(d.result_kind(), Some(Kind::Float));
    }

    #[test]
    fn lookup_and_ordering() {
        let table = AttributeTable::from_entries(&[
            ("power", Descriptor::read_write(FLOAT, "W{:.3f}", "W?")),
            ("frequency", Descriptor::read_write(FLOAT, "f{:.8f}", "f?")),
        ]);

        assert_eq!(table.len(), 2);
        assert!(table.get("frequency").is_some());
        assert!(table.get("nope").is_none());

        let names: Vec<_> = table.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["frequency", "power"]);
    }

    #[test]
    fn validate_reports_problems() {
        let table = AttributeTable::from_entries(&[
            ("empty", Descriptor::new(&[], Some("x"), None)),
            ("silent", Descriptor::new(FLOAT, None, None)),
            ("bad_read", Descriptor::read_write(FLOAT, "f{:.8f}", "f{}?")),
        ]);

        let problems = table.validate();
        assert!(problems.contains(&TableProblem::NoKinds("empty")));
        assert!(problems.contains(&TableProblem::NoTemplates("silent")));
        assert!(problems.iter().any(|p| matches!(
            p,
            TableProblem::Placeholders {
                attribute: "bad_read",
                expected: 0,
                found: 1,
                ..
            }
        )));
    }
}
