mod repository_factory_test;
mod repository_test;

use fake::faker::address::en::CityName;
use fake::faker::internet::en::FreeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use potash::collection::PotashId;
use potash_derive::{Convertible, PotashEntity};
use rand::{rng, Rng};

#[derive(Debug, Clone, PartialEq, Default, Convertible)]
pub struct Address {
    pub street: Option<String>,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Default, Convertible)]
pub enum Shift {
    #[default]
    Day,
    Night {
        hours: i32,
    },
    Split(i32, i32),
}

#[derive(Debug, Clone, PartialEq, Default, Convertible, PotashEntity)]
#[entity(
    name = "employees",
    id(field = "emp_id"),
    index(fields = "email"),
    index(fields = "department", index_type = "non-unique")
)]
#[converter(ignored = "session_token")]
pub struct Employee {
    pub emp_id: u64,
    pub name: String,
    pub email: String,
    pub department: String,
    pub address: Option<Address>,
    pub skills: Vec<String>,
    pub salary: f64,
    pub shift: Shift,
    pub session_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Convertible, PotashEntity)]
#[entity(name = "notes", id(field = "note_id"))]
pub struct Note {
    pub note_id: Option<PotashId>,
    pub text: String,
}

pub fn random_employee(emp_id: u64) -> Employee {
    let mut rng = rng();
    let shift = match rng.random_range(0..3) {
        0 => Shift::Day,
        1 => Shift::Night {
            hours: rng.random_range(4..10),
        },
        _ => Shift::Split(rng.random_range(6..10), rng.random_range(16..20)),
    };
    let departments = ["sales", "ops", "research"];

    Employee {
        emp_id,
        name: Name().fake(),
        email: format!("{}.{}", emp_id, FreeEmail().fake::<String>()),
        department: departments[rng.random_range(0..departments.len())].to_string(),
        address: rng.random_bool(0.7).then(|| Address {
            street: None,
            city: CityName().fake(),
        }),
        skills: (0..rng.random_range(0..4)).map(|i| format!("skill-{}", i)).collect(),
        salary: rng.random_range(1000.0..9000.0),
        shift,
        session_token: None,
    }
}
