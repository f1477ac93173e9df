//! Skip-logic pagination
//!
//! Splits an ordered list of questions into pages. A page ends after any
//! question that branches or that asks for a page break; a survey with
//! neither shows one question per page. Navigation then follows the
//! branch selected by the answers just submitted.

pub mod page;
pub mod paginator;

pub use page::{Page, Redirect};
pub use paginator::SkipLogicPaginator;
