//! Generic CRUD, search and paging routes shared by every resource type.

pub mod controller;
pub mod router;
