//! Shared fixture entities
//!
//! `Person` has a nullable nested `Address`; `Order` holds a required
//! `Person`, giving paths up to three segments deep (`Customer.Address.City`).

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use querex_core::model::{
    FieldType, PropertyInfo, PropertyValue, Reflect, TypeInfo, TypeKind, Value,
};
use uuid::Uuid;

pub static ADDRESS: TypeInfo = TypeInfo::new(
    "Address",
    &[
        PropertyInfo::new("Street", FieldType::required(TypeKind::Text)),
        PropertyInfo::new("City", FieldType::required(TypeKind::Text)),
        PropertyInfo::new("Zip", FieldType::nullable(TypeKind::Int32)),
    ],
);

pub static PERSON: TypeInfo = TypeInfo::new(
    "Person",
    &[
        PropertyInfo::new("Id", FieldType::required(TypeKind::Uuid)),
        PropertyInfo::new("Name", FieldType::required(TypeKind::Text)),
        PropertyInfo::new("Age", FieldType::required(TypeKind::Int32)),
        PropertyInfo::new("Email", FieldType::nullable(TypeKind::Text)),
        PropertyInfo::new("Active", FieldType::required(TypeKind::Bool)),
        PropertyInfo::new("Born", FieldType::nullable(TypeKind::Date)),
        PropertyInfo::new("Address", FieldType::optional_object(&ADDRESS)),
    ],
);

#[allow(dead_code)]
pub static ORDER: TypeInfo = TypeInfo::new(
    "Order",
    &[
        PropertyInfo::new("Number", FieldType::required(TypeKind::Int64)),
        PropertyInfo::new("Total", FieldType::required(TypeKind::Float64)),
        PropertyInfo::new("PlacedAt", FieldType::required(TypeKind::DateTime)),
        PropertyInfo::new("Customer", FieldType::object(&PERSON)),
    ],
);

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub email: Option<String>,
    pub active: bool,
    pub born: Option<NaiveDate>,
    pub address: Option<Address>,
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub number: i64,
    pub total: f64,
    pub placed_at: DateTime<Utc>,
    pub customer: Person,
}

impl Reflect for Address {
    fn type_info() -> &'static TypeInfo {
        &ADDRESS
    }

    fn property(&self, name: &str) -> Option<PropertyValue<'_>> {
        let value = match name {
            "Street" => Value::from(self.street.as_str()),
            "City" => Value::from(self.city.as_str()),
            "Zip" => Value::from(self.zip),
            _ => return None,
        };
        Some(PropertyValue::Scalar(value))
    }
}

impl Reflect for Person {
    fn type_info() -> &'static TypeInfo {
        &PERSON
    }

    fn property(&self, name: &str) -> Option<PropertyValue<'_>> {
        let value = match name {
            "Id" => Value::Uuid(self.id),
            "Name" => Value::from(self.name.as_str()),
            "Age" => Value::Int32(self.age),
            "Email" => Value::from(self.email.clone()),
            "Active" => Value::Bool(self.active),
            "Born" => Value::from(self.born),
            "Address" => {
                return Some(PropertyValue::Object(
                    self.address.as_ref().map(|a| a as &dyn Reflect),
                ))
            }
            _ => return None,
        };
        Some(PropertyValue::Scalar(value))
    }
}

impl Reflect for Order {
    fn type_info() -> &'static TypeInfo {
        &ORDER
    }

    fn property(&self, name: &str) -> Option<PropertyValue<'_>> {
        let value = match name {
            "Number" => Value::Int64(self.number),
            "Total" => Value::Float64(self.total),
            "PlacedAt" => Value::DateTime(self.placed_at),
            "Customer" => return Some(PropertyValue::Object(Some(&self.customer))),
            _ => return None,
        };
        Some(PropertyValue::Scalar(value))
    }
}

/// A person with only name and age set
#[allow(dead_code)]
pub fn person(name: &str, age: i32) -> Person {
    Person {
        id: Uuid::now_v7(),
        name: name.to_string(),
        age,
        email: None,
        active: true,
        born: None,
        address: None,
    }
}

#[allow(dead_code)]
pub fn living_in(mut person: Person, city: &str) -> Person {
    person.address = Some(Address {
        street: "1 Main St".to_string(),
        city: city.to_string(),
        zip: None,
    });
    person
}

#[allow(dead_code)]
pub fn order(number: i64, total: f64, customer: Person) -> Order {
    Order {
        number,
        total,
        placed_at: Utc
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .single()
            .unwrap_or_default(),
        customer,
    }
}

#[allow(dead_code)]
pub fn names(people: &[Person]) -> Vec<&str> {
    people.iter().map(|p| p.name.as_str()).collect()
}
