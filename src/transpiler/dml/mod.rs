//! Statement assembly for SELECT, INSERT, UPDATE and DELETE.
//!
//! Each builder collects clause strings into a list, joins them with single
//! spaces and terminates the statement with `;`.

pub mod delete;
pub mod insert;
pub mod select;
pub mod update;

pub(crate) fn finish(parts: Vec<String>) -> String {
    let mut sql = parts.join(" ");
    sql.push(';');
    sql
}
