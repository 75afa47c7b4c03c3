use bytes::Bytes;
use http::{Method, Request};
use http_body_util::Full;
use micro_mvc::validation::{Validate, ValidationErrors, rules};
use micro_mvc::{
    BinderMetadata, BindingOptions, ModelBinder, ModelMetadata, ModelStateDictionary, ModelType,
    OperationBindingContext,
};
use serde::Deserialize;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(default)]
    employee_id: u32,
    full_name: String,
    gender: String,
    age: u32,
    email: String,
}

impl Validate for Employee {
    fn validate(&self, errors: &mut ValidationErrors) {
        if rules::required(errors, "fullName", &self.full_name) {
            rules::length(errors, "fullName", &self.full_name, 2, 64);
        }
        rules::required(errors, "gender", &self.gender);
        rules::range(errors, "age", self.age, 18, 100);
        if rules::required(errors, "email", &self.email) {
            rules::email(errors, "email", &self.email);
        }
    }
}

// POST /Employee/Create with a form posted by the create view
fn create_request() -> Request<Full<Bytes>> {
    Request::builder()
        .method(Method::POST)
        .uri("/Employee/Create")
        .header(http::header::CONTENT_TYPE, mime::APPLICATION_WWW_FORM_URLENCODED.as_ref())
        .body(Full::new(Bytes::from_static(b"fullName=Jane%20Doe&gender=F&age=34&email=jane%40example.com")))
        .unwrap()
}

// POST /Employee/Edit/7 with a json payload which fails validation
fn edit_request() -> Request<Full<Bytes>> {
    Request::builder()
        .method(Method::POST)
        .uri("/Employee/Edit/7")
        .header(http::header::CONTENT_TYPE, "application/json; charset=utf-8")
        .body(Full::new(Bytes::from_static(
            br#"{"employeeId":7,"fullName":"J","gender":"","age":12,"email":"not-an-email"}"#,
        )))
        .unwrap()
}

async fn bind_employee(options: &BindingOptions, action: &str, request: Request<Full<Bytes>>) {
    let binder = options.composite_binder();
    let operation = OperationBindingContext::from_request(request);
    let metadata = ModelMetadata::new(ModelType::of::<Employee>()).with_binder_metadata(BinderMetadata::FromBody);
    let mut ctx = options.binding_context(metadata, "employee", operation);

    if let Err(e) = binder.bind_model(&mut ctx).await {
        warn!(action, status = %e.status_code(), cause = %e, "bind employee failed");
        return;
    }

    let (model, model_state) = ctx.into_result();
    let employee = model.and_then(|model| model.downcast::<Employee>().ok());
    let employee_id = employee.as_ref().map(|employee| employee.employee_id);
    if model_state.is_valid() {
        info!(action, ?employee_id, ?employee, "employee is valid, redirect to index");
    } else {
        info!(action, ?employee_id, ?employee, "employee is invalid, render the view again");
        print_model_state(&model_state);
    }
}

fn print_model_state(model_state: &ModelStateDictionary) {
    for (key, state) in model_state {
        for error in state.errors() {
            println!("  {key}: {}", error.message());
        }
    }
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let options = BindingOptions::default();
    bind_employee(&options, "Create", create_request()).await;
    bind_employee(&options, "Edit", edit_request()).await;
}
