// src/form.rs

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Category, CompatibleVehicle, Product, ProductUpdate};

/// Shown instead of an empty compatibility list when a product is loaded.
pub const PLACEHOLDER_VEHICLE: (&str, &str, &str) = ("All makes", "All models", "All Years");

/// One row of the compatible-vehicles editor. `row_id` is assigned when the
/// row is created and survives round-trips through the browser, so the DOM
/// can address rows without caring about their position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleRow {
    pub row_id: Uuid,
    pub make: String,
    pub model: String,
    pub year: String,
}

impl VehicleRow {
    pub fn blank() -> Self {
        Self {
            row_id: Uuid::new_v4(),
            make: String::new(),
            model: String::new(),
            year: String::new(),
        }
    }

    fn placeholder() -> Self {
        let (make, model, year) = PLACEHOLDER_VEHICLE;
        Self {
            row_id: Uuid::new_v4(),
            make: make.to_string(),
            model: model.to_string(),
            year: year.to_string(),
        }
    }

    fn from_vehicle(vehicle: CompatibleVehicle) -> Self {
        Self {
            row_id: Uuid::new_v4(),
            make: vehicle.make,
            model: vehicle.model,
            year: vehicle.year,
        }
    }

    fn to_vehicle(&self) -> CompatibleVehicle {
        CompatibleVehicle {
            make: self.make.clone(),
            model: self.model.clone(),
            year: self.year.clone(),
        }
    }
}

/// Editable state of one product, scalar fields kept as the raw strings the
/// admin typed. Validation happens at submission time, not per keystroke.
#[derive(Debug, Clone, Validate)]
pub struct ProductForm {
    #[validate(length(min = 1, message = "Please enter product name"))]
    pub name: String,
    #[validate(length(min = 1, message = "Please enter slug"))]
    pub slug: String,
    #[validate(length(min = 1, message = "Please enter price"))]
    pub price: String,
    #[validate(length(min = 1, message = "Please enter image"))]
    pub image: String,
    #[validate(length(min = 1, message = "Please enter category"))]
    pub category: String,
    #[validate(length(min = 1, message = "Please enter brand"))]
    pub brand: String,
    #[validate(length(min = 1, message = "Please enter countInStock"))]
    pub count_in_stock: String,
    #[validate(length(min = 1, message = "Please enter description"))]
    pub description: String,
    pub vehicles: Vec<VehicleRow>,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            slug: String::new(),
            price: String::new(),
            image: String::new(),
            category: String::new(),
            brand: String::new(),
            count_in_stock: String::new(),
            description: String::new(),
            vehicles: vec![VehicleRow::blank()],
        }
    }
}

impl ProductForm {
    /// Populates every field from a fetched product. An empty compatibility
    /// list normalizes to exactly one placeholder row; a non-empty list is
    /// kept verbatim and in order. This is the only place the placeholder is
    /// ever inserted.
    pub fn from_product(product: Product) -> Self {
        let vehicles = if product.compatible_vehicles.is_empty() {
            vec![VehicleRow::placeholder()]
        } else {
            product
                .compatible_vehicles
                .into_iter()
                .map(VehicleRow::from_vehicle)
                .collect()
        };
        Self {
            name: product.name,
            slug: product.slug,
            price: product.price,
            image: product.image,
            category: product.category,
            brand: product.brand,
            count_in_stock: product.count_in_stock,
            description: product.description,
            vehicles,
        }
    }

    /// Overwrites the form with a submitted body. Scalars are trimmed; vehicle
    /// cells are taken verbatim. Rows that round-tripped through the browser
    /// keep their ids, anything without a parseable id gets a fresh one.
    pub fn apply_input(&mut self, input: FormInput) {
        self.name = input.name.trim().to_string();
        self.slug = input.slug.trim().to_string();
        self.price = input.price.trim().to_string();
        self.image = input.image.trim().to_string();
        self.category = input.category.trim().to_string();
        self.brand = input.brand.trim().to_string();
        self.count_in_stock = input.count_in_stock.trim().to_string();
        self.description = input.description.trim().to_string();
        self.vehicles = input
            .vehicles
            .into_iter()
            .map(|row| VehicleRow {
                row_id: Uuid::parse_str(&row.row_id).unwrap_or_else(|_| Uuid::new_v4()),
                make: row.make,
                model: row.model,
                year: row.year,
            })
            .collect();
    }

    /// Inserts a blank row directly after the given one, or at the end when
    /// the id is not present (also the path for adding to an empty list).
    pub fn append_row_after(&mut self, row_id: Uuid) {
        match self.vehicles.iter().position(|row| row.row_id == row_id) {
            Some(index) => self.vehicles.insert(index + 1, VehicleRow::blank()),
            None => self.vehicles.push(VehicleRow::blank()),
        }
    }

    /// Removes the row with the given id, preserving the order of the rest.
    /// Removing the last row leaves the list empty.
    pub fn remove_row(&mut self, row_id: Uuid) {
        self.vehicles.retain(|row| row.row_id != row_id);
    }

    /// Resolves an image-bearing field by its form name. Only the primary
    /// image exists today; per-vehicle images would slot in here.
    pub fn image_field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "image" => Some(&mut self.image),
            _ => None,
        }
    }

    /// Submission-time validation: every scalar is required and the category
    /// must belong to the closed set. Returns one message per failing field,
    /// keyed by the form field name.
    pub fn validate_submit(&self) -> Result<(), BTreeMap<String, String>> {
        let mut errors = BTreeMap::new();
        if let Err(failures) = self.validate() {
            for (field, field_errors) in failures.field_errors() {
                if let Some(error) = field_errors.first() {
                    let message = error.message.as_ref().map_or_else(
                        || format!("Please enter {field}"),
                        |message| message.to_string(),
                    );
                    errors.insert(field.to_string(), message);
                }
            }
        }
        if !self.category.is_empty() && Category::from_str(&self.category).is_err() {
            errors.insert(
                "category".to_string(),
                "Please select a valid category".to_string(),
            );
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// The full update payload, vehicle rows carried over verbatim.
    pub fn to_update(&self) -> ProductUpdate {
        ProductUpdate {
            name: self.name.clone(),
            slug: self.slug.clone(),
            price: self.price.clone(),
            category: self.category.clone(),
            image: self.image.clone(),
            brand: self.brand.clone(),
            count_in_stock: self.count_in_stock.clone(),
            description: self.description.clone(),
            compatible_vehicles: self.vehicles.iter().map(VehicleRow::to_vehicle).collect(),
        }
    }
}

/// Decoded body of a form post, field names matching the rendered inputs
/// (`vehicles[0][make]` and so on, parsed by serde_qs).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub name: String,
    pub slug: String,
    pub price: String,
    pub image: String,
    pub category: String,
    pub brand: String,
    pub count_in_stock: String,
    pub description: String,
    pub vehicles: Vec<VehicleInput>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VehicleInput {
    pub row_id: String,
    pub make: String,
    pub model: String,
    pub year: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_product(vehicles: Vec<CompatibleVehicle>) -> Product {
        serde_json::from_value(serde_json::json!({
            "name": "Front brake pads",
            "slug": "front-brake-pads",
            "price": "45",
            "image": "https://example.com/pads.jpg",
            "category": "Brakes",
            "brand": "Bosch",
            "countInStock": "12",
            "description": "Ceramic pads",
            "compatibleVehicles": vehicles,
        }))
        .unwrap()
    }

    fn vehicle(make: &str, model: &str, year: &str) -> CompatibleVehicle {
        CompatibleVehicle {
            make: make.to_string(),
            model: model.to_string(),
            year: year.to_string(),
        }
    }

    fn valid_form() -> ProductForm {
        ProductForm::from_product(loaded_product(vec![vehicle("Toyota", "Prado", "2005")]))
    }

    #[test]
    fn default_form_has_one_blank_row() {
        let form = ProductForm::default();
        assert_eq!(form.vehicles.len(), 1);
        assert!(form.vehicles[0].make.is_empty());
        assert!(form.vehicles[0].model.is_empty());
        assert!(form.vehicles[0].year.is_empty());
    }

    #[test]
    fn empty_vehicle_list_normalizes_to_placeholder_row() {
        let form = ProductForm::from_product(loaded_product(vec![]));
        assert_eq!(form.vehicles.len(), 1);
        assert_eq!(form.vehicles[0].make, "All makes");
        assert_eq!(form.vehicles[0].model, "All models");
        assert_eq!(form.vehicles[0].year, "All Years");
    }

    #[test]
    fn loaded_vehicle_rows_are_kept_verbatim_and_in_order() {
        let form = ProductForm::from_product(loaded_product(vec![
            vehicle("Toyota", "Prado", "2005"),
            vehicle("Nissan", "Patrol", "2010"),
        ]));
        assert_eq!(form.vehicles.len(), 2);
        assert_eq!(form.vehicles[0].make, "Toyota");
        assert_eq!(form.vehicles[1].make, "Nissan");
    }

    #[test]
    fn append_after_inserts_blank_row_in_place() {
        let mut form = ProductForm::from_product(loaded_product(vec![
            vehicle("Toyota", "Prado", "2005"),
            vehicle("Nissan", "Patrol", "2010"),
        ]));
        let first = form.vehicles[0].row_id;
        form.append_row_after(first);
        assert_eq!(form.vehicles.len(), 3);
        assert_eq!(form.vehicles[0].make, "Toyota");
        assert!(form.vehicles[1].make.is_empty());
        assert_eq!(form.vehicles[2].make, "Nissan");
    }

    #[test]
    fn append_after_unknown_id_pushes_to_the_end() {
        let mut form = ProductForm::from_product(loaded_product(vec![]));
        form.append_row_after(Uuid::nil());
        assert_eq!(form.vehicles.len(), 2);
        assert!(form.vehicles[1].make.is_empty());
    }

    #[test]
    fn remove_row_preserves_relative_order() {
        let mut form = ProductForm::from_product(loaded_product(vec![
            vehicle("Toyota", "Prado", "2005"),
            vehicle("Nissan", "Patrol", "2010"),
            vehicle("Subaru", "Forester", "2018"),
        ]));
        let middle = form.vehicles[1].row_id;
        form.remove_row(middle);
        assert_eq!(form.vehicles.len(), 2);
        assert_eq!(form.vehicles[0].make, "Toyota");
        assert_eq!(form.vehicles[1].make, "Subaru");
    }

    #[test]
    fn removing_the_last_row_yields_an_empty_list() {
        let mut form = ProductForm::from_product(loaded_product(vec![]));
        let only = form.vehicles[0].row_id;
        form.remove_row(only);
        assert!(form.vehicles.is_empty());
    }

    #[test]
    fn validate_reports_every_empty_required_field() {
        let form = ProductForm {
            vehicles: vec![],
            ..ProductForm::default()
        };
        let errors = form.validate_submit().unwrap_err();
        assert_eq!(errors.get("name").unwrap(), "Please enter product name");
        assert_eq!(errors.get("slug").unwrap(), "Please enter slug");
        assert_eq!(errors.get("price").unwrap(), "Please enter price");
        assert_eq!(errors.get("image").unwrap(), "Please enter image");
        assert_eq!(errors.get("category").unwrap(), "Please enter category");
        assert_eq!(errors.get("brand").unwrap(), "Please enter brand");
        assert_eq!(
            errors.get("count_in_stock").unwrap(),
            "Please enter countInStock"
        );
        assert_eq!(
            errors.get("description").unwrap(),
            "Please enter description"
        );
    }

    #[test]
    fn validate_rejects_category_outside_the_closed_set() {
        let mut form = valid_form();
        form.category = "Motor".to_string();
        let errors = form.validate_submit().unwrap_err();
        assert_eq!(
            errors.get("category").unwrap(),
            "Please select a valid category"
        );
    }

    #[test]
    fn validate_passes_a_fully_populated_form() {
        assert!(valid_form().validate_submit().is_ok());
    }

    #[test]
    fn blank_vehicle_cells_do_not_block_submission() {
        let mut form = valid_form();
        form.vehicles.push(VehicleRow::blank());
        assert!(form.validate_submit().is_ok());
    }

    #[test]
    fn apply_input_keeps_round_tripped_row_ids() {
        let mut form = valid_form();
        let kept_id = form.vehicles[0].row_id;
        form.apply_input(FormInput {
            name: " Front brake pads ".to_string(),
            slug: "front-brake-pads".to_string(),
            price: "45".to_string(),
            image: "https://example.com/pads.jpg".to_string(),
            category: "Brakes".to_string(),
            brand: "Bosch".to_string(),
            count_in_stock: "12".to_string(),
            description: "Ceramic pads".to_string(),
            vehicles: vec![VehicleInput {
                row_id: kept_id.to_string(),
                make: "Toyota".to_string(),
                model: "Prado".to_string(),
                year: "2005, 2006".to_string(),
            }],
        });
        assert_eq!(form.name, "Front brake pads");
        assert_eq!(form.vehicles[0].row_id, kept_id);
        assert_eq!(form.vehicles[0].year, "2005, 2006");
    }

    #[test]
    fn form_input_decodes_indexed_vehicle_fields() {
        let input: FormInput = serde_qs::from_str(
            "name=Pads&slug=pads&price=45&image=x&category=Brakes&brand=Bosch\
             &count_in_stock=12&description=d\
             &vehicles[0][row_id]=a7c9d3fe-1111-2222-3333-444455556666\
             &vehicles[0][make]=Toyota&vehicles[0][model]=Prado&vehicles[0][year]=2005\
             &vehicles[1][row_id]=&vehicles[1][make]=Nissan&vehicles[1][model]=Patrol\
             &vehicles[1][year]=2010",
        )
        .unwrap();
        assert_eq!(input.vehicles.len(), 2);
        assert_eq!(input.vehicles[0].make, "Toyota");
        assert_eq!(input.vehicles[1].make, "Nissan");
    }

    #[test]
    fn to_update_carries_vehicle_rows_verbatim() {
        let form = ProductForm::from_product(loaded_product(vec![
            vehicle("Toyota", "Prado", "2005"),
            vehicle("", "", ""),
        ]));
        let update = form.to_update();
        assert_eq!(update.compatible_vehicles.len(), 2);
        assert_eq!(update.compatible_vehicles[0].make, "Toyota");
        assert!(update.compatible_vehicles[1].make.is_empty());
    }
}
