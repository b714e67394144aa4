//! Cascading filter engine
//!
//! Option lists and results are pure functions of the product slice and a
//! [`FilterState`]; nothing here is cached. The vehicle dimensions form a
//! chain `make → model → year`: a child value is only meaningful while its
//! parent is set, and [`FilterState::set`] enforces that on every transition.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::entities::product::{Product, VehicleApplication};

/// One dimension of the filter state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Make,
    Model,
    Year,
    Category,
    Search,
}

impl FilterField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Make => "make",
            FilterField::Model => "model",
            FilterField::Year => "year",
            FilterField::Category => "category",
            FilterField::Search => "search",
        }
    }
}

impl std::fmt::Display for FilterField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FilterField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "make" => Ok(FilterField::Make),
            "model" => Ok(FilterField::Model),
            "year" | "years" => Ok(FilterField::Year),
            "category" => Ok(FilterField::Category),
            "search" | "text" => Ok(FilterField::Search),
            _ => Err(format!(
                "Unknown filter: {}. Use make, model, year, category or search",
                s
            )),
        }
    }
}

/// Current selection; an empty string means "unconstrained"
///
/// Fields are only writable through [`FilterState::set`], so a model can
/// never be selected without its make, nor a year without its model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    make: String,
    model: String,
    year: String,
    category: String,
    search: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn make(&self) -> &str {
        &self.make
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn get(&self, field: FilterField) -> &str {
        match field {
            FilterField::Make => &self.make,
            FilterField::Model => &self.model,
            FilterField::Year => &self.year,
            FilterField::Category => &self.category,
            FilterField::Search => &self.search,
        }
    }

    /// Apply one selection together with its cascade resets
    ///
    /// Setting `make` clears `model` and `year`; setting `model` clears
    /// `year`. A `model` without a `make` (or `year` without `model`) is
    /// dropped. `category` and `search` touch nothing else.
    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FilterField::Make => {
                self.make = value;
                self.model.clear();
                self.year.clear();
            }
            FilterField::Model => {
                self.model = if self.make.is_empty() { String::new() } else { value };
                self.year.clear();
            }
            FilterField::Year => {
                self.year = if self.model.is_empty() { String::new() } else { value };
            }
            FilterField::Category => self.category = value,
            FilterField::Search => self.search = value,
        }
    }

    /// Builder form of [`FilterState::set`]
    pub fn with(mut self, field: FilterField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Reset every dimension
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether any dimension constrains the result
    pub fn is_active(&self) -> bool {
        !(self.make.is_empty()
            && self.model.is_empty()
            && self.year.is_empty()
            && self.category.is_empty()
            && self.search.is_empty())
    }

    /// Short vehicle summary such as `TOYOTA / Corolla / 2015`
    pub fn vehicle_label(&self) -> Option<String> {
        if self.make.is_empty() {
            return None;
        }
        let mut label = self.make.clone();
        for part in [&self.model, &self.year] {
            if !part.is_empty() {
                label.push_str(" / ");
                label.push_str(part);
            }
        }
        Some(label)
    }

    fn matches_application(&self, app: &VehicleApplication) -> bool {
        (self.make.is_empty() || app.make == self.make)
            && (self.model.is_empty() || app.model == self.model)
            && (self.year.is_empty() || app.years == self.year)
    }

    /// Whether a product satisfies all three clauses
    ///
    /// Products without applications are never excluded by the vehicle
    /// dimensions.
    pub fn matches(&self, product: &Product) -> bool {
        let vehicle = product.applications.is_empty()
            || product.applications.iter().any(|a| self.matches_application(a));
        let category = self.category.is_empty() || product.category == self.category;
        vehicle && category && matches_search(product, &self.search)
    }
}

fn matches_search(product: &Product, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    let hit = |s: &str| s.to_lowercase().contains(&needle);
    hit(&product.sku)
        || hit(&product.name)
        || hit(&product.oem_ref)
        || product.cross_reference.iter().any(|c| hit(&c.part))
}

fn sorted_distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn applications(products: &[Product]) -> impl Iterator<Item = &VehicleApplication> {
    products.iter().flat_map(|p| p.applications.iter())
}

/// Every make any product fits, sorted
pub fn available_makes(products: &[Product]) -> Vec<String> {
    sorted_distinct(applications(products).map(|a| a.make.as_str()))
}

/// Models offered for `make`; empty while no make is selected
pub fn available_models(products: &[Product], make: &str) -> Vec<String> {
    if make.is_empty() {
        return Vec::new();
    }
    sorted_distinct(
        applications(products)
            .filter(|a| a.make == make)
            .map(|a| a.model.as_str()),
    )
}

/// Year labels offered for `make` + `model`; empty unless both are set
pub fn available_years(products: &[Product], make: &str, model: &str) -> Vec<String> {
    if make.is_empty() || model.is_empty() {
        return Vec::new();
    }
    sorted_distinct(
        applications(products)
            .filter(|a| a.make == make && a.model == model)
            .map(|a| a.years.as_str()),
    )
}

/// Categories of the products that fit the selected vehicle
///
/// With no make selected every product counts. The model only narrows when
/// set; the year never does.
pub fn available_categories(products: &[Product], make: &str, model: &str) -> Vec<String> {
    let fits = |p: &&Product| {
        make.is_empty()
            || p.applications
                .iter()
                .any(|a| a.make == make && (model.is_empty() || a.model == model))
    };
    sorted_distinct(products.iter().filter(fits).map(|p| p.category.as_str()))
}

/// Products matching `filters`, in store order
pub fn apply_filters<'a>(products: &'a [Product], filters: &FilterState) -> Vec<&'a Product> {
    products.iter().filter(|p| filters.matches(p)).collect()
}

/// The four option lists for one filter state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub makes: Vec<String>,
    pub models: Vec<String>,
    pub years: Vec<String>,
    pub categories: Vec<String>,
}

impl FilterOptions {
    pub fn compute(products: &[Product], filters: &FilterState) -> Self {
        Self {
            makes: available_makes(products),
            models: available_models(products, filters.make()),
            years: available_years(products, filters.make(), filters.model()),
            categories: available_categories(products, filters.make(), filters.model()),
        }
    }
}
