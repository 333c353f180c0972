//! Filtering and sorting of list fields.
//!
//! List fields take two custom scalar arguments, `filter` (`ListFilter`) and
//! `sort` (`SortFilter`). Both arrive as unparsed literals ([`AstValue`]).

pub mod ast;
pub mod comparator;
pub mod filter;
pub mod sort;

pub use ast::{AstValue, ObjectField};
pub use comparator::{
    new_equal_comparator, new_in_comparator, new_integer_comparator, new_limit_length_comparator,
    new_not_equal_comparator, new_not_in_comparator, Comparator, ComparatorFactory, ComparatorRegistry,
    FilterArguments, IntegerOperation, NotComparator,
};
pub use filter::{new_list_filter, FilterSpec, ListFilter};
pub use sort::{list_sort, parse_sort_parameters, SortOrder, SortSpec};
