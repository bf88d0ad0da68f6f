//! Cascading filter state
//!
//! Region and sub-region form a two-level hierarchy. After any region edit
//! the sub-region is either `Any` or, when the options mapping knows the
//! region, one of the sub-regions listed for it. Option lists are advisory:
//! unknown values are accepted and passed through.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tenderdesk_core::{parse_amount, Error, FilterOptions, SearchRequest};
use tracing::debug;

/// A filter value; `Any` means "no constraint"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FilterValue {
    #[default]
    Any,
    Value(String),
}

impl FilterValue {
    pub fn value(value: impl Into<String>) -> Self {
        Self::Value(value.into())
    }

    /// Parse user input: blank input means `Any`
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            Self::Any
        } else {
            Self::Value(trimmed.to_string())
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Any => None,
            Self::Value(value) => Some(value),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "すべて"),
            Self::Value(value) => write!(f, "{}", value),
        }
    }
}

/// Filter fields, in display and request order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterField {
    Region,
    SubRegion,
    UseType,
    BidMethod,
    MinPrice,
    MaxPrice,
}

impl FilterField {
    pub const ALL: [FilterField; 6] = [
        Self::Region,
        Self::SubRegion,
        Self::UseType,
        Self::BidMethod,
        Self::MinPrice,
        Self::MaxPrice,
    ];

    /// Name used in search requests
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Region => "prefecture",
            Self::SubRegion => "municipality",
            Self::UseType => "use_type",
            Self::BidMethod => "bid_method",
            Self::MinPrice => "min_price",
            Self::MaxPrice => "max_price",
        }
    }
}

impl FromStr for FilterField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.wire_name() == s)
            .ok_or_else(|| Error::validation(format!("unknown filter field '{}'", s)))
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Current value of every filter field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    fields: BTreeMap<FilterField, FilterValue>,
}

impl FilterState {
    /// All fields `Any`
    pub fn new() -> Self {
        Self {
            fields: FilterField::ALL
                .into_iter()
                .map(|field| (field, FilterValue::Any))
                .collect(),
        }
    }

    pub fn get(&self, field: FilterField) -> &FilterValue {
        static ANY: FilterValue = FilterValue::Any;
        self.fields.get(&field).unwrap_or(&ANY)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterField, &FilterValue)> {
        self.fields.iter().map(|(field, value)| (*field, value))
    }

    /// True when no field is constrained
    pub fn is_unconstrained(&self) -> bool {
        self.fields.values().all(FilterValue::is_any)
    }

    fn set(&mut self, field: FilterField, value: FilterValue) {
        self.fields.insert(field, value);
    }

    /// Request with `Any` fields stripped and prices parsed to integers
    pub fn to_request(&self) -> SearchRequest {
        let text = |field| self.get(field).as_value().map(str::to_string);
        let amount = |field| self.get(field).as_value().and_then(parse_amount);

        SearchRequest {
            prefecture: text(FilterField::Region),
            municipality: text(FilterField::SubRegion),
            use_type: text(FilterField::UseType),
            bid_method: text(FilterField::BidMethod),
            min_price: amount(FilterField::MinPrice),
            max_price: amount(FilterField::MaxPrice),
        }
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&FilterState> for SearchRequest {
    fn from(state: &FilterState) -> Self {
        state.to_request()
    }
}

/// Applies filter edits and enforces the region / sub-region invariant
#[derive(Debug, Clone, Default)]
pub struct FilterController {
    state: FilterState,
    options: Option<FilterOptions>,
}

impl FilterController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: FilterOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Install options that arrived after construction. The current state is
    /// left untouched; the invariant is enforced from the next region edit.
    pub fn set_options(&mut self, options: FilterOptions) {
        self.options = Some(options);
    }

    pub fn options(&self) -> Option<&FilterOptions> {
        self.options.as_ref()
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Apply one edit and return the resulting state
    pub fn set_field(&mut self, field: FilterField, value: FilterValue) -> &FilterState {
        if field == FilterField::Region {
            let clear_sub_region = match value.as_value() {
                None => true,
                Some(region) => self.sub_region_outside(region),
            };
            if clear_sub_region && !self.state.get(FilterField::SubRegion).is_any() {
                debug!(region = %value, "clearing sub-region after region change");
                self.state.set(FilterField::SubRegion, FilterValue::Any);
            }
        }

        self.state.set(field, value);
        &self.state
    }

    /// All fields back to `Any`
    pub fn reset(&mut self) -> &FilterState {
        self.state = FilterState::new();
        &self.state
    }

    /// Sub-regions to offer: the mapped list for the selected region when
    /// known, otherwise every known sub-region
    pub fn sub_region_choices(&self) -> Vec<String> {
        let Some(options) = &self.options else {
            return Vec::new();
        };

        self.state
            .get(FilterField::Region)
            .as_value()
            .and_then(|region| options.sub_regions_of(region))
            .unwrap_or(options.municipalities.as_slice())
            .to_vec()
    }

    fn sub_region_outside(&self, region: &str) -> bool {
        let Some(allowed) = self
            .options
            .as_ref()
            .and_then(|options| options.sub_regions_of(region))
        else {
            return false;
        };

        match self.state.get(FilterField::SubRegion).as_value() {
            Some(sub_region) => !allowed.iter().any(|s| s == sub_region),
            None => false,
        }
    }
}
