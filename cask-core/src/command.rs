use crate::{ArgumentError, AsValue, Result, Value, separated_by, truncate_long, write_value};
use std::{
    borrow::Cow,
    fmt::{self, Display},
    sync::Arc,
    time::Duration,
};

/// How the command text must be interpreted by the driver.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Plain SQL text.
    #[default]
    Text,
    /// Name of a stored procedure.
    StoredProcedure,
}

impl Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CommandKind::Text => "text",
            CommandKind::StoredProcedure => "stored procedure",
        })
    }
}

/// Named command parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Cow<'static, str>,
    pub value: Value,
}

impl Parameter {
    pub fn new(name: impl Into<Cow<'static, str>>, value: impl AsValue) -> Self {
        Self {
            name: name.into(),
            value: value.as_value(),
        }
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, truncate_long!(self.value.to_string()))
    }
}

/// Descriptor of a database command: text, kind, timeout and ordered parameters.
///
/// A processor keeps its descriptor as an immutable template. Every execution
/// works on a fresh copy which parameter building and transforms may rewrite.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    text: Arc<str>,
    kind: CommandKind,
    timeout: Option<Duration>,
    parameters: Vec<Parameter>,
}

impl Command {
    pub fn new(text: impl Into<Arc<str>>, kind: CommandKind) -> Self {
        Self {
            text: text.into(),
            kind,
            timeout: None,
            parameters: Vec::new(),
        }
    }
    /// Plain SQL command.
    pub fn text(text: impl Into<Arc<str>>) -> Self {
        Self::new(text, CommandKind::Text)
    }
    /// Stored procedure call.
    pub fn procedure(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, CommandKind::StoredProcedure)
    }
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
    pub fn with_parameter(mut self, name: impl Into<Cow<'static, str>>, value: impl AsValue) -> Self {
        self.parameters.push(Parameter::new(name, value));
        self
    }

    pub fn command_text(&self) -> &str {
        &self.text
    }
    pub fn kind(&self) -> CommandKind {
        self.kind
    }
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn set_text(&mut self, text: impl Into<Arc<str>>) {
        self.text = text.into();
    }
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }
    pub fn parameters_mut(&mut self) -> &mut Vec<Parameter> {
        &mut self.parameters
    }

    /// Set `name` to `value`, replacing the value in place when the parameter already exists.
    pub fn bind(&mut self, parameter: Parameter) {
        match self.parameters.iter_mut().find(|p| p.name == parameter.name) {
            Some(existing) => existing.value = parameter.value,
            None => self.parameters.push(parameter),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(ArgumentError::new("command", "the command text is empty").into());
        }
        if let Some(parameter) = self.parameters.iter().find(|p| p.name.trim().is_empty()) {
            return Err(ArgumentError::new(
                "parameters",
                format!("a parameter with value {} has no name", parameter.value),
            )
            .into());
        }
        Ok(())
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parameters = String::new();
        separated_by(
            &mut parameters,
            &self.parameters,
            |out, p| {
                out.push_str(&p.name);
                out.push('=');
                write_value(out, &p.value);
            },
            ", ",
        );
        write!(f, "{} `{}`", self.kind, truncate_long!(self.text))?;
        if let Some(timeout) = self.timeout {
            write!(f, " (timeout {:?})", timeout)?;
        }
        write!(f, " with parameters [{}]", truncate_long!(parameters))
    }
}

/// Caller supplied filter or value object producing the parameters of one execution.
pub trait ParameterSource {
    fn parameters(&self) -> Result<Vec<Parameter>>;
}

impl ParameterSource for () {
    fn parameters(&self) -> Result<Vec<Parameter>> {
        Ok(Vec::new())
    }
}

impl ParameterSource for [Parameter] {
    fn parameters(&self) -> Result<Vec<Parameter>> {
        Ok(self.to_vec())
    }
}

impl<const N: usize> ParameterSource for [Parameter; N] {
    fn parameters(&self) -> Result<Vec<Parameter>> {
        Ok(self.to_vec())
    }
}

impl ParameterSource for Vec<Parameter> {
    fn parameters(&self) -> Result<Vec<Parameter>> {
        Ok(self.clone())
    }
}

impl<T: ParameterSource + ?Sized> ParameterSource for &T {
    fn parameters(&self) -> Result<Vec<Parameter>> {
        (**self).parameters()
    }
}

/// Rewrites a built command just before it is executed.
pub type CommandTransform = Arc<dyn Fn(&mut Command) -> Result<()> + Send + Sync>;

/// Build the command of one execution out of `template` and the supplied `source`.
///
/// Template parameters are defaults, supplied ones replace them by name or are
/// appended. Transforms run afterwards, in the order given.
pub fn build_command<'t>(
    template: &Command,
    source: &dyn ParameterSource,
    transforms: impl IntoIterator<Item = &'t CommandTransform>,
) -> Result<Command> {
    let mut command = template.clone();
    for parameter in source.parameters()? {
        command.bind(parameter);
    }
    for transform in transforms {
        transform(&mut command)?;
    }
    command.validate()?;
    Ok(command)
}
