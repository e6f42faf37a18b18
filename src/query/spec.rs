//! Declarative query specifications
//!
//! A `QuerySpec` describes one relational read as plain data: the base
//! entity, the entities joined onto it, projections, filters, group keys,
//! order keys and an optional limit. Join conditions are never written by
//! hand; they are resolved from the foreign-key graph between entities.
//!
//! Rendering produces parameterized SQL. Identifiers are bound as
//! parameters, never interpolated.

use crate::{Error, Result};

/// The five tables of the academic-records schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Teacher,
    Discipline,
    Group,
    Student,
    Grade,
}

impl Entity {
    pub fn table(&self) -> &'static str {
        match self {
            Entity::Teacher => "teachers",
            Entity::Discipline => "disciplines",
            Entity::Group => "groups",
            Entity::Student => "students",
            Entity::Grade => "grades",
        }
    }

    pub const fn col(self, name: &'static str) -> Column {
        Column { entity: self, name }
    }
}

/// Foreign keys as (child, column on child, parent). Parents are keyed by `id`.
const FOREIGN_KEYS: &[(Entity, &str, Entity)] = &[
    (Entity::Discipline, "teacher_id", Entity::Teacher),
    (Entity::Student, "group_id", Entity::Group),
    (Entity::Grade, "student_id", Entity::Student),
    (Entity::Grade, "discipline_id", Entity::Discipline),
];

/// A qualified column reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    pub entity: Entity,
    pub name: &'static str,
}

impl Column {
    fn sql(&self) -> String {
        format!("\"{}\".\"{}\"", self.entity.table(), self.name)
    }
}

/// One output column of a query
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Column(Column),
    Sum(Column),
    Count(Column),
    Max(Column),
}

impl Projection {
    fn column(&self) -> Column {
        match self {
            Projection::Column(c)
            | Projection::Sum(c)
            | Projection::Count(c)
            | Projection::Max(c) => *c,
        }
    }

    fn sql(&self) -> String {
        match self {
            Projection::Column(c) => c.sql(),
            Projection::Sum(c) => format!("SUM({})", c.sql()),
            Projection::Count(c) => format!("COUNT({})", c.sql()),
            Projection::Max(c) => format!("MAX({})", c.sql()),
        }
    }
}

/// A row predicate. All filters of a spec are combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = ?`
    Eq(Column, i64),
    /// `column = (SELECT ...)`; the subquery must project one column
    EqSubquery(Column, Box<QuerySpec>),
}

impl Filter {
    fn column(&self) -> Column {
        match self {
            Filter::Eq(c, _) | Filter::EqSubquery(c, _) => *c,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderExpr {
    Column(Column),
    /// Unrounded arithmetic mean of the column over the group
    Mean(Column),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderKey {
    pub expr: OrderExpr,
    pub direction: Direction,
}

impl OrderKey {
    pub fn asc(expr: OrderExpr) -> Self {
        Self { expr, direction: Direction::Asc }
    }

    pub fn desc(expr: OrderExpr) -> Self {
        Self { expr, direction: Direction::Desc }
    }

    fn column(&self) -> Column {
        match self.expr {
            OrderExpr::Column(c) | OrderExpr::Mean(c) => c,
        }
    }

    fn sql(&self) -> String {
        let expr = match self.expr {
            OrderExpr::Column(c) => c.sql(),
            OrderExpr::Mean(c) => format!("AVG({})", c.sql()),
        };
        format!("{} {}", expr, self.direction.as_str())
    }
}

/// Immutable description of a single relational read.
///
/// Built with the consuming builder methods below, then handed by reference
/// to a `RelationalStore`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    base: Entity,
    joins: Vec<Entity>,
    projections: Vec<Projection>,
    filters: Vec<Filter>,
    group_by: Vec<Column>,
    order_by: Vec<OrderKey>,
    limit: Option<u32>,
    distinct: bool,
}

/// SQL text plus positional parameters, in placeholder order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedQuery {
    pub sql: String,
    pub params: Vec<i64>,
}

impl QuerySpec {
    pub fn from_entity(base: Entity) -> Self {
        Self {
            base,
            joins: Vec::new(),
            projections: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            distinct: false,
        }
    }

    pub fn join(mut self, entity: Entity) -> Self {
        self.joins.push(entity);
        self
    }

    pub fn select(mut self, projection: Projection) -> Self {
        self.projections.push(projection);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn group_by(mut self, column: Column) -> Self {
        self.group_by.push(column);
        self
    }

    pub fn order_by(mut self, key: OrderKey) -> Self {
        self.order_by.push(key);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Entities visible to column references, base first
    fn entities(&self) -> Vec<Entity> {
        let mut all = Vec::with_capacity(self.joins.len() + 1);
        all.push(self.base);
        all.extend(self.joins.iter().copied());
        all
    }

    /// Render to SQL with `?` placeholders.
    pub fn render(&self) -> Result<RenderedQuery> {
        let mut params = Vec::new();
        let sql = self.render_into(&mut params)?;
        Ok(RenderedQuery { sql, params })
    }

    fn render_into(&self, params: &mut Vec<i64>) -> Result<String> {
        self.validate()?;

        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        let projections: Vec<String> = self.projections.iter().map(Projection::sql).collect();
        sql.push_str(&projections.join(", "));

        sql.push_str(&format!(" FROM \"{}\"", self.base.table()));
        let mut joined = vec![self.base];
        for &entity in &self.joins {
            let condition = join_condition(entity, &joined)?;
            sql.push_str(&format!(" JOIN \"{}\" ON {}", entity.table(), condition));
            joined.push(entity);
        }

        if !self.filters.is_empty() {
            let mut predicates = Vec::with_capacity(self.filters.len());
            for filter in &self.filters {
                match filter {
                    Filter::Eq(column, value) => {
                        predicates.push(format!("{} = ?", column.sql()));
                        params.push(*value);
                    }
                    Filter::EqSubquery(column, subquery) => {
                        let inner = subquery.render_into(params)?;
                        predicates.push(format!("{} = ({})", column.sql(), inner));
                    }
                }
            }
            sql.push_str(" WHERE ");
            sql.push_str(&predicates.join(" AND "));
        }

        if !self.group_by.is_empty() {
            let keys: Vec<String> = self.group_by.iter().map(Column::sql).collect();
            sql.push_str(" GROUP BY ");
            sql.push_str(&keys.join(", "));
        }

        if !self.order_by.is_empty() {
            let keys: Vec<String> = self.order_by.iter().map(OrderKey::sql).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        Ok(sql)
    }

    fn validate(&self) -> Result<()> {
        if self.projections.is_empty() {
            return Err(Error::InvalidQuery("query selects no columns".to_string()));
        }

        let entities = self.entities();
        for (i, entity) in entities.iter().enumerate() {
            if entities[..i].contains(entity) {
                return Err(Error::InvalidQuery(format!(
                    "table {} joined more than once",
                    entity.table()
                )));
            }
        }

        let referenced = self
            .projections
            .iter()
            .map(Projection::column)
            .chain(self.filters.iter().map(Filter::column))
            .chain(self.group_by.iter().copied())
            .chain(self.order_by.iter().map(OrderKey::column));
        for column in referenced {
            if !entities.contains(&column.entity) {
                return Err(Error::InvalidQuery(format!(
                    "column {} references table {} which is not joined",
                    column.name,
                    column.entity.table()
                )));
            }
        }

        for filter in &self.filters {
            if let Filter::EqSubquery(_, subquery) = filter {
                if subquery.projections.len() != 1 {
                    return Err(Error::InvalidQuery(
                        "scalar subquery must select exactly one column".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// ON clause linking `entity` to the first already-joined entity it shares
/// a foreign key with.
fn join_condition(entity: Entity, joined: &[Entity]) -> Result<String> {
    for &existing in joined {
        for &(child, fk, parent) in FOREIGN_KEYS {
            let linked = (child == entity && parent == existing)
                || (child == existing && parent == entity);
            if linked {
                return Ok(format!("{} = {}", child.col(fk).sql(), parent.col("id").sql()));
            }
        }
    }
    Err(Error::InvalidQuery(format!(
        "no foreign key links {} to the joined tables",
        entity.table()
    )))
}
