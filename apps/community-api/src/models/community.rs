use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::schema::communities;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = communities)]
pub struct Community {
    pub id: i32,
    pub name: String,
    pub language: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = communities)]
pub struct NewCommunity<'a> {
    pub name: &'a str,
    pub language: Option<&'a str>,
    pub description: Option<&'a str>,
}
