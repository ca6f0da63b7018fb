//! Product taxonomy lookups (Class/Group/Shape/Material/Coating/Thread/Spec
//! and the SKU-level Length/Diameter variants).
//!
//! Each dimension is its own type. Upserting by name goes through the
//! [`NamedLookup`] trait, so merging seed or admin input never needs to
//! poke at fields generically.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Capability shared by every taxonomy lookup entity.
pub trait NamedLookup {
    /// Dimension name, used in logs.
    const KIND: &'static str;

    fn name(&self) -> &str;

    fn display_name(&self) -> &str;

    fn value(&self) -> Option<&str> {
        None
    }

    fn description(&self) -> Option<&str> {
        None
    }

    /// Copies the mutable attributes of `other` into `self`.
    ///
    /// Returns whether anything changed. The id and name are kept.
    fn merge_from(&mut self, other: Self) -> bool
    where
        Self: Sized;
}

/// Result of [`upsert_by_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

/// Inserts `incoming`, or merges it into the entry with the same name
/// (case-insensitive).
pub fn upsert_by_name<T: NamedLookup>(entries: &mut Vec<T>, incoming: T) -> UpsertOutcome {
    let key = incoming.name().trim().to_lowercase();
    match entries
        .iter_mut()
        .find(|e| e.name().trim().to_lowercase() == key)
    {
        Some(existing) => {
            if existing.merge_from(incoming) {
                UpsertOutcome::Updated
            } else {
                UpsertOutcome::Unchanged
            }
        }
        None => {
            entries.push(incoming);
            UpsertOutcome::Inserted
        }
    }
}

macro_rules! lookup_entity {
    ($(#[$meta:meta])* $ty:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $ty {
            #[serde(default = "Uuid::new_v4")]
            pub id: Uuid,
            pub name: String,
            #[serde(default)]
            pub display_name: String,
        }

        impl NamedLookup for $ty {
            const KIND: &'static str = $kind;

            fn name(&self) -> &str {
                &self.name
            }

            fn display_name(&self) -> &str {
                &self.display_name
            }

            fn merge_from(&mut self, other: Self) -> bool {
                let changed = self.display_name != other.display_name;
                self.display_name = other.display_name;
                changed
            }
        }
    };
    ($(#[$meta:meta])* $ty:ident, $kind:literal, value) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $ty {
            #[serde(default = "Uuid::new_v4")]
            pub id: Uuid,
            pub name: String,
            #[serde(default)]
            pub display_name: String,
            #[serde(default)]
            pub value: Option<String>,
        }

        impl NamedLookup for $ty {
            const KIND: &'static str = $kind;

            fn name(&self) -> &str {
                &self.name
            }

            fn display_name(&self) -> &str {
                &self.display_name
            }

            fn value(&self) -> Option<&str> {
                self.value.as_deref()
            }

            fn merge_from(&mut self, other: Self) -> bool {
                let changed =
                    self.display_name != other.display_name || self.value != other.value;
                self.display_name = other.display_name;
                self.value = other.value;
                changed
            }
        }
    };
    ($(#[$meta:meta])* $ty:ident, $kind:literal, description) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $ty {
            #[serde(default = "Uuid::new_v4")]
            pub id: Uuid,
            pub name: String,
            #[serde(default)]
            pub display_name: String,
            #[serde(default)]
            pub description: Option<String>,
        }

        impl NamedLookup for $ty {
            const KIND: &'static str = $kind;

            fn name(&self) -> &str {
                &self.name
            }

            fn display_name(&self) -> &str {
                &self.display_name
            }

            fn description(&self) -> Option<&str> {
                self.description.as_deref()
            }

            fn merge_from(&mut self, other: Self) -> bool {
                let changed = self.display_name != other.display_name
                    || self.description != other.description;
                self.display_name = other.display_name;
                self.description = other.description;
                changed
            }
        }
    };
}

lookup_entity!(
    /// Top-level product class (e.g. "Bolts").
    ProductClass,
    "class"
);
lookup_entity!(ProductGroup, "group");
lookup_entity!(Shape, "shape");
lookup_entity!(Material, "material", description);
lookup_entity!(Coating, "coating", description);
lookup_entity!(
    /// Thread designation; `value` holds the pitch notation.
    Thread,
    "thread",
    value
);
lookup_entity!(Spec, "spec", description);
lookup_entity!(
    /// SKU length variant; `value` is the nominal length.
    Length,
    "length",
    value
);
lookup_entity!(Diameter, "diameter", value);

/// All taxonomy dimensions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Taxonomy {
    pub classes: Vec<ProductClass>,
    pub groups: Vec<ProductGroup>,
    pub shapes: Vec<Shape>,
    pub materials: Vec<Material>,
    pub coatings: Vec<Coating>,
    pub threads: Vec<Thread>,
    pub specs: Vec<Spec>,
    pub lengths: Vec<Length>,
    pub diameters: Vec<Diameter>,
}

/// Counts from a [`Taxonomy::merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl MergeSummary {
    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }
}

fn merge_all<T: NamedLookup>(target: &mut Vec<T>, incoming: Vec<T>, summary: &mut MergeSummary) {
    for entry in incoming {
        summary.record(upsert_by_name(target, entry));
    }
}

impl Taxonomy {
    /// Upserts every entry of `other` by name.
    pub fn merge(&mut self, other: Taxonomy) -> MergeSummary {
        let mut summary = MergeSummary::default();
        merge_all(&mut self.classes, other.classes, &mut summary);
        merge_all(&mut self.groups, other.groups, &mut summary);
        merge_all(&mut self.shapes, other.shapes, &mut summary);
        merge_all(&mut self.materials, other.materials, &mut summary);
        merge_all(&mut self.coatings, other.coatings, &mut summary);
        merge_all(&mut self.threads, other.threads, &mut summary);
        merge_all(&mut self.specs, other.specs, &mut summary);
        merge_all(&mut self.lengths, other.lengths, &mut summary);
        merge_all(&mut self.diameters, other.diameters, &mut summary);
        summary
    }

    pub fn len(&self) -> usize {
        self.classes.len()
            + self.groups.len()
            + self.shapes.len()
            + self.materials.len()
            + self.coatings.len()
            + self.threads.len()
            + self.specs.len()
            + self.lengths.len()
            + self.diameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
