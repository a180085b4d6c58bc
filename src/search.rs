use crate::params::{ParamValue, Params};

/// Parameters of the `api/gis-csv` search export.
///
/// Field names follow Redfin's query keys. `al`, `ord`, `status`, `uipt` and `v`
/// are passed through untouched; their meaning is defined by Redfin.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResultsQuery {
    pub region_id: ParamValue,
    pub region_type: ParamValue,
    pub al: i64,
    pub has_deal: bool,
    pub has_dishwasher: bool,
    pub has_laundry_facility: bool,
    pub has_laundry_hookups: bool,
    pub has_parking: bool,
    pub has_pool: bool,
    pub has_short_term_lease: bool,
    pub include_pending_homes: bool,
    pub is_rentals: bool,
    pub is_furnished: bool,
    pub market: String,
    pub num_homes: i64,
    pub ord: String,
    pub page_number: i64,
    pub sold_within_days: i64,
    pub status: i64,
    pub travel_with_traffic: bool,
    pub travel_within_region: bool,
    pub uipt: String,
    pub utilities_included: bool,
    pub v: i64,
    /// Extra keys sent verbatim; they override the fields above.
    pub extra: Params,
}

impl SearchResultsQuery {
    pub fn new(region_id: impl Into<ParamValue>, region_type: impl Into<ParamValue>) -> Self {
        Self {
            region_id: region_id.into(),
            region_type: region_type.into(),
            al: 1,
            has_deal: false,
            has_dishwasher: false,
            has_laundry_facility: false,
            has_laundry_hookups: false,
            has_parking: false,
            has_pool: false,
            has_short_term_lease: false,
            include_pending_homes: false,
            is_rentals: false,
            is_furnished: false,
            market: "dc".to_string(),
            num_homes: 5000,
            ord: "redfin-recommended-asc".to_string(),
            page_number: 1,
            sold_within_days: 1825,
            status: 9,
            travel_with_traffic: false,
            travel_within_region: false,
            uipt: "1,2,3,4,5,6,7,8".to_string(),
            utilities_included: false,
            v: 8,
            extra: Params::new(),
        }
    }

    pub fn market(mut self, market: impl Into<String>) -> Self {
        self.market = market.into();
        self
    }

    pub fn num_homes(mut self, num_homes: i64) -> Self {
        self.num_homes = num_homes;
        self
    }

    pub fn page_number(mut self, page_number: i64) -> Self {
        self.page_number = page_number;
        self
    }

    pub fn sold_within_days(mut self, days: i64) -> Self {
        self.sold_within_days = days;
        self
    }

    pub fn rentals(mut self, is_rentals: bool) -> Self {
        self.is_rentals = is_rentals;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.extra.insert(key, value);
        self
    }

    pub(crate) fn to_params(&self) -> Params {
        let mut params = Params::new()
            .with("al", self.al)
            .with("has_deal", self.has_deal)
            .with("has_dishwasher", self.has_dishwasher)
            .with("has_laundry_facility", self.has_laundry_facility)
            .with("has_laundry_hookups", self.has_laundry_hookups)
            .with("has_parking", self.has_parking)
            .with("has_pool", self.has_pool)
            .with("has_short_term_lease", self.has_short_term_lease)
            .with("include_pending_homes", self.include_pending_homes)
            .with("isRentals", self.is_rentals)
            .with("is_furnished", self.is_furnished)
            .with("market", self.market.as_str())
            .with("num_homes", self.num_homes)
            .with("ord", self.ord.as_str())
            .with("page_number", self.page_number)
            .with("region_id", self.region_id.clone())
            .with("region_type", self.region_type.clone())
            .with("sold_within_days", self.sold_within_days)
            .with("status", self.status)
            .with("travel_with_traffic", self.travel_with_traffic)
            .with("travel_within_region", self.travel_within_region)
            .with("uipt", self.uipt.as_str())
            .with("utilities_included", self.utilities_included)
            .with("v", self.v);
        params.extend(&self.extra);
        params
    }
}
