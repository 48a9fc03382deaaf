use std::any::{type_name, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DEFINITION: AtomicU64 = AtomicU64::new(1);

/// Runtime identity of a record schema.
///
/// Two records may only be merged when their schema identities are equal.
/// Identity combines the Rust type carrying the record with a schema name, so
/// two dynamic records sharing a carrier type but bound to different schemas
/// are still incompatible. Structural similarity never counts.
///
/// Schemas defined at runtime also carry a definition token, so two
/// definitions that happen to share a name stay distinct. Token `0` marks an
/// identity without one.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SchemaId {
    type_id: TypeId,
    name: Cow<'static, str>,
    definition: u64,
}

impl SchemaId {
    /// Identity of a statically typed record, named after the Rust type.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: Cow::Borrowed(type_name::<T>()),
            definition: 0,
        }
    }

    /// Identity of a schema named at runtime and carried by `T`.
    pub fn named<T: ?Sized + 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: name.into(),
            definition: 0,
        }
    }

    /// Identity of a runtime schema definition carried by `T`.
    ///
    /// Every call issues a fresh definition token, so the result only equals
    /// its own clones.
    pub fn unique<T: ?Sized + 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            definition: next_definition(),
            ..Self::named::<T>(name)
        }
    }

    /// Same name and carrier, fresh definition token.
    pub fn reissue(&self) -> Self {
        Self {
            definition: next_definition(),
            ..self.clone()
        }
    }

    /// The definition token, `0` if this identity has none.
    pub fn definition(&self) -> u64 {
        self.definition
    }

    /// The schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The Rust type carrying records of this schema.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns `true` if both identities share a carrier type.
    pub fn same_carrier(&self, other: &SchemaId) -> bool {
        self.type_id == other.type_id
    }
}

impl fmt::Debug for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.definition == 0 {
            write!(f, "SchemaId({})", self.name)
        } else {
            write!(f, "SchemaId({}#{})", self.name, self.definition)
        }
    }
}

fn next_definition() -> u64 {
    NEXT_DEFINITION.fetch_add(1, Ordering::Relaxed)
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
