pub mod employee;
pub mod user;

pub use employee::{Employee, EmployeeFilter, EmployeePatch, EmployeeView, NewEmployee};
pub use user::{NewUser, User, UserLookup};
