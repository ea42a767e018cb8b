use serde::Deserialize;

use crate::entities::BloodStock;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub blood_group: Option<String>,
    pub city: Option<String>,
}

/// Narrows a stock snapshot: exact blood-group match (or no filter) AND
/// case-insensitive city substring match (or no filter). Empty strings
/// count as no filter, same as the search form's unset fields.
pub fn filter_stocks(
    stocks: Vec<BloodStock>,
    blood_group: Option<&str>,
    city: Option<&str>,
) -> Vec<BloodStock> {
    let blood_group = blood_group.map(str::trim).filter(|s| !s.is_empty());
    let city = city
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    stocks
        .into_iter()
        .filter(|stock| match blood_group {
            Some(bg) => stock.blood_group.as_deref() == Some(bg),
            None => true,
        })
        .filter(|stock| match &city {
            Some(c) => stock
                .city
                .as_deref()
                .is_some_and(|stock_city| stock_city.to_lowercase().contains(c)),
            None => true,
        })
        .collect()
}
