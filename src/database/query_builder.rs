//! SQL for the passthrough operations. Every statement returns rows as a
//! single JSON column named `row` so decoding does not depend on the
//! store's column types.

use sqlx::{Postgres, QueryBuilder};

use crate::database::models::{NewSchool, SchoolChanges};

/// A store table and the SQL type of its primary key. Ids arrive as text
/// and are cast on the parameter side so lookups use the key index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    pub id_type: &'static str,
}

pub const SCHOOLS_TABLE: Table = Table {
    name: "escuelas",
    id_type: "bigint",
};

pub const PROFILES_TABLE: Table = Table {
    name: "Usuarios",
    id_type: "uuid",
};

/// Quote SQL identifier to prevent injection
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl Table {
    fn quoted(&self) -> String {
        quote_identifier(self.name)
    }

    /// `id = $n::<key type>`
    fn id_matches(&self, placeholder: usize) -> String {
        format!("id = ${}::{}", placeholder, self.id_type)
    }
}

pub fn select_all(table: Table) -> String {
    format!(
        "SELECT row_to_json(t) AS row FROM (SELECT * FROM {} ORDER BY id) t",
        table.quoted()
    )
}

pub fn select_by_id(table: Table) -> String {
    format!(
        "SELECT row_to_json(t) AS row FROM (SELECT * FROM {} WHERE {}) t",
        table.quoted(),
        table.id_matches(1)
    )
}

pub fn delete_by_id(table: Table) -> String {
    format!(
        "WITH deleted AS (DELETE FROM {} WHERE {} RETURNING *) \
         SELECT row_to_json(deleted) AS row FROM deleted",
        table.quoted(),
        table.id_matches(1)
    )
}

pub fn update_profile_name() -> String {
    format!(
        "WITH updated AS (UPDATE {} SET name = $1 WHERE {} RETURNING *) \
         SELECT row_to_json(updated) AS row FROM updated",
        PROFILES_TABLE.quoted(),
        PROFILES_TABLE.id_matches(2)
    )
}

pub fn insert_school(school: NewSchool) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "WITH inserted AS (INSERT INTO {} (name, address, phone, school_email, location, active) VALUES (",
        SCHOOLS_TABLE.quoted()
    ));
    let mut values = qb.separated(", ");
    values.push_bind(school.name);
    values.push_bind(school.address);
    values.push_bind(school.phone);
    values.push_bind(school.school_email);
    values.push_bind(school.location);
    values.push_bind(school.active);
    qb.push(") RETURNING *) SELECT row_to_json(inserted) AS row FROM inserted");
    qb
}

/// UPDATE touching only the columns present in `changes`. Callers reject
/// empty change sets before getting here.
pub fn update_school(id: &str, changes: SchoolChanges) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "WITH updated AS (UPDATE {} SET ",
        SCHOOLS_TABLE.quoted()
    ));

    let mut set = qb.separated(", ");
    if let Some(v) = changes.name {
        set.push("name = ").push_bind_unseparated(v);
    }
    if let Some(v) = changes.address {
        set.push("address = ").push_bind_unseparated(v);
    }
    if let Some(v) = changes.phone {
        set.push("phone = ").push_bind_unseparated(v);
    }
    if let Some(v) = changes.school_email {
        set.push("school_email = ").push_bind_unseparated(v);
    }
    if let Some(v) = changes.location {
        set.push("location = ").push_bind_unseparated(v);
    }
    if let Some(v) = changes.active {
        set.push("active = ").push_bind_unseparated(v);
    }

    qb.push(" WHERE id = ");
    qb.push_bind(id.to_string());
    qb.push(format!("::{}", SCHOOLS_TABLE.id_type));
    qb.push(" RETURNING *) SELECT row_to_json(updated) AS row FROM updated");
    qb
}
