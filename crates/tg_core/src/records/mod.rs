//! Record types and the collections that hold them.
//!
//! | Type | Rows | Extra invariant |
//! |------|------|-----------------|
//! | `Records<R>` | any `R` | schema of `R` |
//! | `Events` | `Event` | bound pitch |
//! | `Shots` | `Shot` | every `type_ == "shot"` |
//! | `Part` | `Event` | exactly one `part` value |

pub mod collection;
pub mod entity;
pub mod events;
pub mod table;
pub mod view;

pub use collection::{Collection, CollectionKind, Records};
pub use entity::{
    Competition, Event, Frame, GameInfo, Player, Record, Shot, Team, ID_COLUMN, PART_COLUMN,
    TYPE_COLUMN,
};
pub use events::{BaseEvents, EventRecord, Events, Part, Shots};
pub use table::records_to_table;
pub use view::{ColumnValues, FieldValue, Filters, Row, TableView};
