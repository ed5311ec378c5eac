use minijinja::Environment;
use serde::Serialize;
use std::sync::Arc;

const INDEX: &str = "index.html";

/// Compiled page templates. Cheap to clone.
#[derive(Clone)]
pub struct Templates {
    env: Arc<Environment<'static>>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(INDEX, include_str!("../templates/index.html"))?;
        Ok(Self { env: Arc::new(env) })
    }

    pub fn render_index<S: Serialize>(&self, ctx: S) -> Result<String, minijinja::Error> {
        self.env.get_template(INDEX)?.render(ctx)
    }
}
