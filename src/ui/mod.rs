pub mod fax_form;
pub mod settings;
