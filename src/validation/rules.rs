use std::collections::HashMap;

use serde_json::{Map, Value};
use uuid::Uuid;

use super::{validate, Check, FieldError, FieldRule, Input, Rule, Validated};
use crate::models::{EmployeePatch, NewEmployee, UserLookup};

const INVALID_EMPLOYEE_ID: &str = "Invalid employee ID";

pub const SIGNUP: &[Rule] = &[
    Rule::Field(FieldRule::required("username", Check::Text, "Username is required")),
    Rule::Field(FieldRule::required("email", Check::Email, "Valid email is required")),
    Rule::Field(FieldRule::required(
        "password",
        Check::Secret { min_len: 6 },
        "Password must be at least 6 characters",
    )),
];

pub const LOGIN: &[Rule] = &[
    Rule::Field(FieldRule::required(
        "password",
        Check::Secret { min_len: 1 },
        "Password is required",
    )),
    Rule::Field(
        FieldRule::optional("email", Check::Text, "Email must be a string")
            .lowercased()
            .blank_as_absent(),
    ),
    Rule::Field(
        FieldRule::optional("username", Check::Text, "Username must be a string").blank_as_absent(),
    ),
    Rule::AnyOf {
        label: "email",
        fields: &["email", "username"],
        message: "Either email or username is required",
    },
];

pub const CREATE_EMPLOYEE: &[Rule] = &[
    Rule::Field(FieldRule::required("first_name", Check::Text, "First name is required")),
    Rule::Field(FieldRule::required("last_name", Check::Text, "Last name is required")),
    Rule::Field(FieldRule::required("email", Check::Email, "Valid email is required")),
    Rule::Field(FieldRule::required("position", Check::Text, "Position is required")),
    Rule::Field(FieldRule::required(
        "salary",
        Check::Number { min: Some(0.0) },
        "Salary must be a non-negative number",
    )),
    Rule::Field(FieldRule::required(
        "date_of_joining",
        Check::Date,
        "Date of joining must be a valid date",
    )),
    Rule::Field(FieldRule::required("department", Check::Text, "Department is required")),
    Rule::Field(FieldRule::optional(
        "profile_picture",
        Check::AnyText,
        "Profile picture must be a string",
    )),
];

pub const UPDATE_EMPLOYEE: &[Rule] = &[
    Rule::Field(FieldRule::required("eid", Check::Id, INVALID_EMPLOYEE_ID).in_params()),
    Rule::Field(FieldRule::optional("first_name", Check::Text, "First name must be a non-empty string")),
    Rule::Field(FieldRule::optional("last_name", Check::Text, "Last name must be a non-empty string")),
    Rule::Field(FieldRule::optional("email", Check::Email, "Valid email is required")),
    Rule::Field(FieldRule::optional("position", Check::Text, "Position must be a non-empty string")),
    Rule::Field(FieldRule::optional(
        "salary",
        Check::Number { min: Some(0.0) },
        "Salary must be a non-negative number",
    )),
    Rule::Field(FieldRule::optional(
        "date_of_joining",
        Check::Date,
        "Date of joining must be a valid date",
    )),
    Rule::Field(FieldRule::optional("department", Check::Text, "Department must be a non-empty string")),
    Rule::Field(FieldRule::optional(
        "profile_picture",
        Check::AnyText,
        "Profile picture must be a string",
    )),
];

pub const EMPLOYEE_ID_PARAM: &[Rule] =
    &[Rule::Field(FieldRule::required("eid", Check::Id, INVALID_EMPLOYEE_ID).in_params())];

pub const EMPLOYEE_ID_QUERY: &[Rule] =
    &[Rule::Field(FieldRule::required("eid", Check::Id, INVALID_EMPLOYEE_ID).in_query())];

#[derive(Debug, Clone)]
pub struct Signup {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Login {
    pub lookup: UserLookup,
    pub password: String,
}

pub fn signup(body: &Map<String, Value>) -> Result<Signup, Vec<FieldError>> {
    let mut v = validate(SIGNUP, &Input::body(body))?;
    Ok(Signup {
        username: v.text("username").unwrap_or_default(),
        email: v.text("email").unwrap_or_default(),
        password: v.text("password").unwrap_or_default(),
    })
}

/// Email wins when both identifiers are supplied.
pub fn login(body: &Map<String, Value>) -> Result<Login, Vec<FieldError>> {
    let mut v = validate(LOGIN, &Input::body(body))?;
    let lookup = match (v.text("email"), v.text("username")) {
        (Some(email), _) => UserLookup::Email(email),
        (None, Some(username)) => UserLookup::Username(username),
        (None, None) => UserLookup::Username(String::new()),
    };
    Ok(Login {
        lookup,
        password: v.text("password").unwrap_or_default(),
    })
}

pub fn create_employee(body: &Map<String, Value>) -> Result<NewEmployee, Vec<FieldError>> {
    let mut v = validate(CREATE_EMPLOYEE, &Input::body(body))?;
    Ok(NewEmployee {
        first_name: v.text("first_name").unwrap_or_default(),
        last_name: v.text("last_name").unwrap_or_default(),
        email: v.text("email").unwrap_or_default(),
        position: v.text("position").unwrap_or_default(),
        salary: v.number("salary").unwrap_or_default(),
        date_of_joining: v.date("date_of_joining").unwrap_or_default(),
        department: v.text("department").unwrap_or_default(),
        profile_picture: v.text("profile_picture").unwrap_or_default(),
    })
}

pub fn update_employee(
    eid: &str,
    body: &Map<String, Value>,
) -> Result<(Uuid, EmployeePatch), Vec<FieldError>> {
    let params = id_map(eid);
    let input = Input {
        body: Some(body),
        params: Some(&params),
        query: None,
    };
    let mut v = validate(UPDATE_EMPLOYEE, &input)?;
    let id = required_id(&mut v)?;
    let patch = EmployeePatch {
        first_name: v.text("first_name"),
        last_name: v.text("last_name"),
        email: v.text("email"),
        position: v.text("position"),
        salary: v.number("salary"),
        date_of_joining: v.date("date_of_joining"),
        department: v.text("department"),
        profile_picture: v.text("profile_picture"),
    };
    Ok((id, patch))
}

pub fn employee_id_param(eid: &str) -> Result<Uuid, Vec<FieldError>> {
    let params = id_map(eid);
    let input = Input {
        params: Some(&params),
        ..Default::default()
    };
    required_id(&mut validate(EMPLOYEE_ID_PARAM, &input)?)
}

pub fn employee_id_query(query: &HashMap<String, String>) -> Result<Uuid, Vec<FieldError>> {
    let input = Input {
        query: Some(query),
        ..Default::default()
    };
    required_id(&mut validate(EMPLOYEE_ID_QUERY, &input)?)
}

fn id_map(eid: &str) -> HashMap<String, String> {
    HashMap::from([("eid".to_string(), eid.to_string())])
}

fn required_id(v: &mut Validated) -> Result<Uuid, Vec<FieldError>> {
    // A passing rule set always carries the id.
    v.id("eid").ok_or_else(Vec::new)
}
