pub mod spec;
pub mod executor;
pub mod catalog;
pub mod analytics;

pub use spec::{Column, Direction, Entity, Filter, OrderExpr, OrderKey, Projection, QuerySpec, RenderedQuery};
pub use executor::{Record, RelationalStore, Value};
pub use analytics::{
    AnalyticsEngine, DisciplineLeader, GroupAverage, GroupGrade, SessionGrade, StudentAverage,
};
