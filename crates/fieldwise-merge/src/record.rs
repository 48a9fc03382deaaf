//! The [`Record`] trait: the capability set the merge engine needs.
//!
//! A record exposes its schema identity, enumerates its fields in declaration
//! order, checks whether a field is present, and copies a single field from
//! another record of the same type. Structs usually get this through
//! [`impl_record!`](crate::impl_record); schemas known only at runtime use
//! [`DynamicRecord`](crate::DynamicRecord).

use std::any::Any;
use std::borrow::Cow;

use fieldwise_types::{MergePolicy, SchemaId};

use crate::error::AccessFault;

/// Name and declared policy of one field of a schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: Cow<'static, str>,
    policy: Option<MergePolicy>,
}

impl FieldDescriptor {
    /// Describe a field with an optional declared policy.
    pub fn new(name: impl Into<Cow<'static, str>>, policy: Option<MergePolicy>) -> Self {
        Self {
            name: name.into(),
            policy,
        }
    }

    /// Describe a field that declares no policy.
    pub fn undeclared(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, None)
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The policy declared on the schema, if any.
    pub fn declared_policy(&self) -> Option<MergePolicy> {
        self.policy
    }

    /// The declared policy or the default.
    pub fn policy(&self) -> MergePolicy {
        MergePolicy::resolve(self.policy)
    }
}

/// A structured value the merge engine can fold field by field.
///
/// Implementations must report fields in a stable order and must only
/// mutate `self` in [`Record::assign`]; the source record is read-only.
pub trait Record: 'static {
    /// Runtime schema identity of this record.
    fn schema(&self) -> SchemaId;

    /// The schema's fields in declaration order.
    fn fields(&self) -> Vec<FieldDescriptor>;

    /// Whether the named field currently holds a present value.
    fn is_present(&self, field: &str) -> Result<bool, AccessFault>;

    /// Replace the named field with the value held by `source`.
    ///
    /// Absent values are copied as well; deciding whether to call this for an
    /// absent value is the engine's job.
    fn assign(&mut self, field: &str, source: &Self) -> Result<(), AccessFault>;
}

/// A type-erased value that still reports a schema identity.
///
/// Every `'static` type implements this, which lets callers hand the engine an
/// incoming value of unknown type and get a [`SchemaMismatch`] naming both
/// sides instead of a failed downcast.
///
/// [`SchemaMismatch`]: crate::MergeError::SchemaMismatch
pub trait AnyValue: Any {
    /// Schema identity of the concrete type.
    fn type_schema(&self) -> SchemaId;

    /// Upcast for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AnyValue for T {
    fn type_schema(&self) -> SchemaId {
        SchemaId::of::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Implement [`Record`] for a struct with named fields.
///
/// Each listed field may declare a policy after `=>`; fields without one
/// resolve to `Required`. Field types must implement `Clone` and
/// [`Presence`](crate::Presence). Fields left out of the list are not part of
/// the schema and are never touched.
///
/// ```rust
/// use fieldwise_merge::{impl_record, merge_into};
///
/// #[derive(Clone, Debug, Default)]
/// struct Profile {
///     id: u64,
///     nickname: Option<String>,
///     avatar: Option<String>,
/// }
///
/// impl_record!(Profile {
///     id => Ignored,
///     nickname,
///     avatar => Mandatory,
/// });
///
/// let mut base = Profile { id: 1, nickname: Some("old".into()), avatar: Some("a.png".into()) };
/// let update = Profile { id: 2, nickname: None, avatar: None };
/// merge_into(&mut base, &update).unwrap();
/// assert_eq!(base.id, 1);
/// assert_eq!(base.nickname.as_deref(), Some("old"));
/// assert_eq!(base.avatar, None);
/// ```
#[macro_export]
macro_rules! impl_record {
    ($ty:ty { $($field:ident $(=> $policy:ident)?),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn schema(&self) -> $crate::SchemaId {
                $crate::SchemaId::of::<Self>()
            }

            fn fields(&self) -> ::std::vec::Vec<$crate::FieldDescriptor> {
                ::std::vec![
                    $(
                        $crate::FieldDescriptor::new(
                            ::core::stringify!($field),
                            $crate::__declared_policy!($($policy)?),
                        ),
                    )*
                ]
            }

            fn is_present(
                &self,
                field: &str,
            ) -> ::core::result::Result<bool, $crate::AccessFault> {
                match field {
                    $(
                        ::core::stringify!($field) => ::core::result::Result::Ok(
                            $crate::Presence::is_present(&self.$field),
                        ),
                    )*
                    other => ::core::result::Result::Err($crate::AccessFault::unknown(other)),
                }
            }

            fn assign(
                &mut self,
                field: &str,
                source: &Self,
            ) -> ::core::result::Result<(), $crate::AccessFault> {
                let _ = source;
                match field {
                    $(
                        ::core::stringify!($field) => {
                            self.$field = ::core::clone::Clone::clone(&source.$field);
                            ::core::result::Result::Ok(())
                        }
                    )*
                    other => ::core::result::Result::Err($crate::AccessFault::unknown(other)),
                }
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __declared_policy {
    () => {
        ::core::option::Option::None
    };
    ($policy:ident) => {
        ::core::option::Option::Some($crate::MergePolicy::$policy)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Contact {
        email: Option<String>,
        phone: Option<String>,
        visits: u32,
        notes: Vec<String>,
    }

    crate::impl_record!(Contact {
        email => Mandatory,
        phone,
        visits => Ignored,
    });

    #[derive(Clone, Debug, Default)]
    struct Marker;

    crate::impl_record!(Marker {});

    #[test]
    fn descriptor_resolves_default() {
        let undeclared = FieldDescriptor::undeclared("x");
        assert_eq!(undeclared.declared_policy(), None);
        assert_eq!(undeclared.policy(), MergePolicy::Required);

        let declared = FieldDescriptor::new("y", Some(MergePolicy::Ignored));
        assert_eq!(declared.policy(), MergePolicy::Ignored);
        assert_eq!(declared.name(), "y");
    }

    #[test]
    fn macro_lists_fields_in_order() {
        let fields = Contact::default().fields();
        let names: Vec<&str> = fields.iter().map(FieldDescriptor::name).collect();
        assert_eq!(names, ["email", "phone", "visits"]);
        assert_eq!(fields[0].declared_policy(), Some(MergePolicy::Mandatory));
        assert_eq!(fields[1].declared_policy(), None);
        assert_eq!(fields[2].declared_policy(), Some(MergePolicy::Ignored));
    }

    #[test]
    fn macro_schema_is_type_identity() {
        assert_eq!(Contact::default().schema(), SchemaId::of::<Contact>());
        assert_ne!(Contact::default().schema(), Marker.schema());
    }

    #[test]
    fn macro_checks_presence() {
        let contact = Contact {
            email: Some("a@b.c".into()),
            ..Default::default()
        };
        assert_eq!(contact.is_present("email"), Ok(true));
        assert_eq!(contact.is_present("phone"), Ok(false));
        assert_eq!(contact.is_present("visits"), Ok(true));
    }

    #[test]
    fn unlisted_field_is_unknown() {
        let mut contact = Contact::default();
        let source = contact.clone();
        assert_eq!(
            contact.is_present("notes"),
            Err(AccessFault::unknown("notes"))
        );
        assert_eq!(
            contact.assign("notes", &source),
            Err(AccessFault::unknown("notes"))
        );
    }

    #[test]
    fn assign_copies_one_field() {
        let mut base = Contact {
            email: Some("old@x".into()),
            phone: Some("1".into()),
            visits: 3,
            notes: vec!["keep".into()],
        };
        let source = Contact {
            email: None,
            phone: Some("2".into()),
            visits: 9,
            notes: Vec::new(),
        };
        base.assign("email", &source).unwrap();
        assert_eq!(base.email, None);
        assert_eq!(base.phone.as_deref(), Some("1"));
        assert_eq!(base.visits, 3);
        assert_eq!(base.notes, vec!["keep".to_string()]);
    }

    #[test]
    fn empty_schema_has_no_fields() {
        assert!(Marker.fields().is_empty());
    }

    #[test]
    fn any_value_reports_concrete_schema() {
        let value: &dyn AnyValue = &"aaa";
        assert_eq!(value.type_schema(), SchemaId::of::<&str>());
        assert!(value.as_any().downcast_ref::<&str>().is_some());
    }
}
