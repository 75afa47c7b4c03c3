/// A request body to bind, along with the content type it is posted with.
#[derive(Debug, Clone)]
pub struct BindCase {
    name: &'static str,
    content_type: &'static str,
    payload: String,
}

impl BindCase {
    pub fn new(name: &'static str, content_type: &'static str, payload: String) -> Self {
        Self { name, content_type, payload }
    }

    pub fn json(name: &'static str, group: BindGroup) -> Self {
        Self::new(name, "application/json", json_payload(group.addresses()))
    }

    pub fn form(name: &'static str) -> Self {
        Self::new(name, "application/x-www-form-urlencoded", form_payload())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}

#[derive(Clone, Copy, Debug)]
pub enum BindGroup {
    Small,
    Normal,
    Large,
}

impl BindGroup {
    fn addresses(self) -> usize {
        match self {
            BindGroup::Small => 0,
            BindGroup::Normal => 16,
            BindGroup::Large => 1024,
        }
    }
}

fn json_payload(addresses: usize) -> String {
    let mut payload = String::from(r#"{"fullName":"Jane Doe","age":34,"email":"jane@example.com","addresses":["#);
    for i in 0..addresses {
        if i > 0 {
            payload.push(',');
        }
        payload.push_str(&format!(r#"{{"street":"{i} Main Street","city":"Springfield"}}"#));
    }
    payload.push_str("]}");
    payload
}

fn form_payload() -> String {
    "fullName=Jane%20Doe&age=34&email=jane%40example.com".to_string()
}

