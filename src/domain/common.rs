use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Opaque identifier shared by every board entity.
pub type EntityId = String;

pub fn generate_id() -> EntityId {
    Uuid::new_v4().to_string()
}

/// An entity ranked among its siblings by a zero-based `order`.
pub trait Ordered {
    fn order(&self) -> usize;
    fn set_order(&mut self, order: usize);
}

pub trait Identified {
    fn id(&self) -> &str;
}

pub trait Timestamped {
    fn updated_at(&self) -> DateTime<Utc>;
    fn set_updated_at(&mut self, at: DateTime<Utc>);

    /// Refresh `updated_at` without ever moving it backwards.
    fn touch(&mut self) {
        let now = Utc::now();
        if now > self.updated_at() {
            self.set_updated_at(now);
        }
    }
}

/// `updated_at` for a freshly created entity: an explicit value wins,
/// otherwise it never trails `created_at`.
pub fn creation_stamp(
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    requested: Option<DateTime<Utc>>,
) -> DateTime<Utc> {
    requested.unwrap_or(now.max(created_at))
}

/// Copy every `Some` field of a patch onto the target.
macro_rules! overlay {
    ($target:expr, $patch:expr; $($field:ident),* $(,)?) => {
        $(
            if let Some(value) = &$patch.$field {
                $target.$field = value.clone();
            }
        )*
    };
}
pub(crate) use overlay;

macro_rules! impl_entity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::domain::common::Identified for $ty {
                fn id(&self) -> &str {
                    &self.id
                }
            }

            impl $crate::domain::common::Timestamped for $ty {
                fn updated_at(&self) -> chrono::DateTime<chrono::Utc> {
                    self.updated_at
                }

                fn set_updated_at(&mut self, at: chrono::DateTime<chrono::Utc>) {
                    self.updated_at = at;
                }
            }
        )*
    };
}
pub(crate) use impl_entity;

macro_rules! impl_ordered {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::domain::common::Ordered for $ty {
                fn order(&self) -> usize {
                    self.order
                }

                fn set_order(&mut self, order: usize) {
                    self.order = order;
                }
            }
        )*
    };
}
pub(crate) use impl_ordered;

const PALETTE: [&str; 10] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#06B6D4", "#84CC16", "#F97316",
    "#EC4899", "#6366F1",
];

/// Pick a display colour for a new container.
pub fn random_color() -> String {
    let seed = Uuid::new_v4().as_bytes()[0] as usize;
    PALETTE[seed % PALETTE.len()].to_string()
}
