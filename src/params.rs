//! Query-parameter and identifier types.
//!
//! Redfin accepts ids and flags either as text or as numbers, so every value
//! is carried as a [`ParamValue`] and rendered to its string form only when
//! the query string is built.

use std::collections::BTreeMap;
use std::fmt;

/// A scalar query-parameter or path-segment value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl ParamValue {
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, ParamValue::Str(s) if s.is_empty())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(n) => write!(f, "{n}"),
            ParamValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<&String> for ParamValue {
    fn from(s: &String) -> Self {
        ParamValue::Str(s.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

macro_rules! int_param {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ParamValue {
                fn from(n: $t) -> Self {
                    ParamValue::Int(i64::from(n))
                }
            }
        )*
    };
}

int_param!(i8, i16, i32, i64, u8, u16, u32);

/// Ordered query-parameter map.
///
/// Later writes replace earlier ones, which is how every merge in this crate
/// expresses precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Overlays `other` on top of `self`; keys in `other` win.
    pub fn extend(&mut self, other: &Params) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Region taxonomy used in `api/region/{regionType}/...` paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionType {
    Neighborhood = 1,
    Zip = 2,
    County = 5,
    City = 6,
}

impl From<RegionType> for ParamValue {
    fn from(t: RegionType) -> Self {
        ParamValue::Int(t as i64)
    }
}

/// Property categories accepted as an extra region path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    House = 1,
    Condo = 2,
    Townhouse = 3,
    MultiFamily = 4,
    Land = 5,
    Other = 6,
}

impl From<PropertyType> for ParamValue {
    fn from(t: PropertyType) -> Self {
        ParamValue::Int(t as i64)
    }
}

/// A `(regionType, regionId)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub region_type: ParamValue,
    pub region_id: ParamValue,
}

impl Region {
    pub fn new(region_type: impl Into<ParamValue>, region_id: impl Into<ParamValue>) -> Self {
        Self {
            region_type: region_type.into(),
            region_id: region_id.into(),
        }
    }

    /// The snake_case keys used by the `gis` and market-insights endpoints.
    pub(crate) fn to_query_params(&self) -> Params {
        Params::new()
            .with("region_type", self.region_type.clone())
            .with("region_id", self.region_id.clone())
    }
}

/// A property, optionally scoped to one of its listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRef {
    pub property_id: ParamValue,
    pub listing_id: Option<ParamValue>,
}

impl PropertyRef {
    pub fn new(property_id: impl Into<ParamValue>) -> Self {
        Self {
            property_id: property_id.into(),
            listing_id: None,
        }
    }

    pub fn with_listing(mut self, listing_id: impl Into<ParamValue>) -> Self {
        self.listing_id = Some(listing_id.into());
        self
    }

    pub(crate) fn to_params(&self) -> Params {
        let mut params = Params::new().with("propertyId", self.property_id.clone());
        if let Some(listing_id) = self.listing_id.as_ref().filter(|l| !l.is_empty()) {
            params.insert("listingId", listing_id.clone());
        }
        params
    }
}

/// Graph series under `api/graph/{T}/{R}/All/regional-housing-market/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HousingMarketGraph {
    HomePrices,
    Demand,
}

impl HousingMarketGraph {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            HousingMarketGraph::HomePrices => "home_prices",
            HousingMarketGraph::Demand => "demand",
        }
    }
}
