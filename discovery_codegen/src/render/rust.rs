//! Reference renderer producing Rust modules.
//!
//! Every package becomes a module directory with a `mod.rs` index. Each
//! top-level type gets its own file, re-exported from the index; types nested
//! in a type live in a child module named after the enclosing type, so
//! `model.Event.Attendees` is rendered as `model::event::Attendees`.
//!
//! Generated code refers to types by absolute `crate::` paths and to the client
//! runtime through [`RustRenderer::runtime_crate`]. The runtime is expected to
//! provide `Client`, `ClientRequest<T>`, `Method`, `Content`, `Error`,
//! `require`, the `Date`/`DateTime`/`TimeZone` value types and the
//! `rfc3339::option` serde module.

use super::{Renderer, SourceUnit};
use crate::assembler::GeneratedApi;
use crate::descriptor::{
    ClassDescriptor, ClassKind, ConstantDescriptor, ConstantValue, ConstructorDescriptor,
    Declaration, EnumConstant, EnumDescriptor, Expr, FieldDescriptor, ParamDescriptor, Primitive,
    QualifiedName, RuntimeType, SerializationOverride, Statement, TypeDescriptor,
};
use crate::identifier::{COLLISION_SUFFIX, Identifier, is_reserved};
use crate::runtime_contract::{BASE_REQUEST, RuntimeParamKind};
use heck::{ToSnakeCase, ToUpperCamelCase};
use std::collections::BTreeMap;
use std::path::PathBuf;

const HEADER: &str = "//! Generated by discoverygen. Do not edit manually.";

/// Internal fields of service types. Parameter-derived names never end in `__`
/// unless they are keywords, so these cannot collide with generated fields.
const CLIENT_FIELD: &str = "client__";
const BASE_FIELD: &str = "base__";

/// Line buffer that tracks indentation.
#[derive(Debug, Default)]
struct SourceWriter {
    buf: String,
    depth: usize,
}

impl SourceWriter {
    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.buf.push_str("    ");
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
    }

    /// Writes pre-rendered text at the current indentation.
    fn block(&mut self, text: &str) {
        for line in text.lines() {
            self.line(line);
        }
    }

    fn open(&mut self, text: &str) {
        self.line(text);
        self.depth += 1;
    }

    fn close(&mut self, text: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    /// Blank line between items, except at the start of a file or block.
    fn gap(&mut self) {
        if !self.buf.is_empty() && !self.buf.ends_with("{\n") && !self.buf.ends_with("\n\n") {
            self.buf.push('\n');
        }
    }

    fn finish(self) -> String {
        self.buf
    }
}

/// Escape a string for use inside a Rust double-quoted literal or attribute.
fn escape_for_rust_attr(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Emit a doc comment from documentation text: each line becomes a `///` line.
fn emit_doc_comment(out: &mut SourceWriter, documentation: Option<&str>) {
    let Some(text) = documentation.map(str::trim).filter(|t| !t.is_empty()) else {
        return;
    };
    for line in text.lines() {
        let line: &str = line.trim_end();
        if line.is_empty() {
            out.line("///");
        } else {
            out.line(&format!("/// {line}"));
        }
    }
}

fn escape_reserved(name: String) -> String {
    if is_reserved(&name) {
        format!("{name}{COLLISION_SUFFIX}")
    } else {
        name
    }
}

/// Prefixes `name` when it is empty or starts with a digit.
fn with_ident_start(name: String, prefix: &str) -> String {
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{prefix}{name}")
    } else {
        name
    }
}

/// Module name of a package segment or of an enclosing type.
fn module_name(name: &str) -> String {
    escape_reserved(with_ident_start(name.to_snake_case(), "m"))
}

/// Type name as written in Rust; names that are not plain identifiers are upper-camel-cased.
fn type_name(name: &str) -> String {
    let is_plain: bool = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    let name: String = if is_plain {
        name.to_string()
    } else {
        name.to_upper_camel_case()
    };
    escape_reserved(with_ident_start(name, "T"))
}

/// Field, parameter or method name for an identifier: snake case of the wire name.
fn field_name(identifier: &Identifier) -> String {
    escape_reserved(with_ident_start(identifier.wire_name().to_snake_case(), "f"))
}

/// Variant name for an enum wire value: upper camel case, `E`-prefixed when it
/// would not start a valid identifier.
fn to_rust_variant_name(value: &str) -> String {
    escape_reserved(with_ident_start(value.to_upper_camel_case(), "E"))
}

/// Variant names for enum constants, in constant order. Repeated wire values
/// are dropped; colliding variant names get an index suffix.
fn build_enum_variants(constants: &[EnumConstant]) -> Vec<(String, &EnumConstant)> {
    let mut unique: Vec<&EnumConstant> = Vec::with_capacity(constants.len());
    for constant in constants {
        if !unique
            .iter()
            .any(|c| c.identifier.wire_name() == constant.identifier.wire_name())
        {
            unique.push(constant);
        }
    }

    let base_names: Vec<String> = unique
        .iter()
        .map(|c| to_rust_variant_name(c.identifier.wire_name()))
        .collect();
    let mut name_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for base in &base_names {
        *name_counts.entry(base.as_str()).or_insert(0) += 1;
    }

    let mut name_indices: BTreeMap<&str, usize> = BTreeMap::new();
    let mut result: Vec<(String, &EnumConstant)> = Vec::with_capacity(unique.len());
    for (constant, base_name) in unique.into_iter().zip(base_names.iter()) {
        let rust_name: String = if name_counts.get(base_name.as_str()).copied().unwrap_or(0) > 1 {
            let index: &mut usize = name_indices.entry(base_name.as_str()).or_insert(0);
            let name: String = format!("{base_name}_{index}");
            *index += 1;
            name
        } else {
            base_name.clone()
        };
        result.push((rust_name, constant));
    }
    result
}

fn constructor_returns_result(constructor: &ConstructorDescriptor) -> bool {
    constructor.body.iter().any(|statement| match statement {
        Statement::RequireNonNull { .. } => true,
        Statement::ForwardToBase { args } => args
            .iter()
            .enumerate()
            .any(|(index, arg)| wraps_content(arg, index, &constructor.params)),
    })
}

/// True when `arg` passes a typed body where the base constructor expects raw content.
fn wraps_content(arg: &Expr, index: usize, params: &[ParamDescriptor]) -> bool {
    let Expr::Param(identifier) = arg else {
        return false;
    };
    let expects_content: bool = BASE_REQUEST
        .primary_constructor()
        .and_then(|c| c.params.get(index))
        .is_some_and(|p| p.kind == RuntimeParamKind::Content);
    let already_content: bool = params
        .iter()
        .any(|p| p.identifier == *identifier && p.ty == TypeDescriptor::Runtime(RuntimeType::Content));
    expects_content && !already_content
}

/// True when the class extends a generated request base type.
fn extends_generated_request(class: &ClassDescriptor) -> bool {
    matches!(
        class.super_type,
        Some(TypeDescriptor::Parameterized { ref raw, .. }) if matches!(**raw, TypeDescriptor::Named(_))
    )
}

fn constant_value(class: &ClassDescriptor, constant: &ConstantDescriptor) -> String {
    match constant.value {
        ConstantValue::Literal(ref value) => value.clone(),
        ConstantValue::Concat(ref names) => names
            .iter()
            .filter_map(|name| class.constant(name))
            .filter_map(|c| match c.value {
                ConstantValue::Literal(ref value) => Some(value.as_str()),
                ConstantValue::Concat(_) => None,
            })
            .collect(),
    }
}

fn package_dir(package: &[String]) -> PathBuf {
    package.iter().map(|segment| module_name(segment)).collect()
}

/// Renders generated APIs as Rust modules.
#[derive(Debug, Clone)]
pub struct RustRenderer {
    runtime_crate: String,
}

impl RustRenderer {
    #[must_use]
    pub fn new(runtime_crate: impl Into<String>) -> Self {
        Self {
            runtime_crate: runtime_crate.into(),
        }
    }

    /// Path of the client runtime crate in generated code.
    #[must_use]
    pub fn runtime_crate(&self) -> &str {
        &self.runtime_crate
    }

    /// Renders the API as nested `pub mod` blocks in a single string, starting
    /// at the first segment of its package.
    #[must_use]
    pub fn render_inline(&self, api: &GeneratedApi) -> String {
        let mut out: SourceWriter = SourceWriter::default();
        for segment in &api.package {
            out.open(&format!("pub mod {} {{", module_name(segment)));
        }

        let model_module: String = api
            .model_package
            .last()
            .map_or_else(|| "model".to_string(), |s| module_name(s));
        out.open(&format!("pub mod {model_module} {{"));
        for model in &api.models {
            self.write_inline_module(&mut out, model);
        }
        write_reexports(&mut out, api.models.iter());
        out.close("}");

        for class in [&api.request, &api.client] {
            self.write_inline_module(&mut out, class);
        }
        write_reexports(&mut out, [&api.request, &api.client].into_iter());

        for _ in &api.package {
            out.close("}");
        }
        out.finish()
    }

    fn write_inline_module(&self, out: &mut SourceWriter, class: &ClassDescriptor) {
        out.gap();
        out.open(&format!("pub mod {} {{", module_name(class.name.simple_name())));
        out.block(&self.module_source(class));
        out.close("}");
    }

    /// A file holding a top-level class.
    fn class_file(&self, class: &ClassDescriptor) -> String {
        format!("{HEADER}\n\n{}", self.module_source(class))
    }

    /// Contents of the module of a top-level class: the class, then its nested tree.
    fn module_source(&self, class: &ClassDescriptor) -> String {
        let mut out: SourceWriter = SourceWriter::default();
        self.write_class(&mut out, class);
        self.write_nested(&mut out, &class.nested);
        out.finish()
    }

    fn write_nested(&self, out: &mut SourceWriter, declarations: &[Declaration]) {
        for declaration in declarations {
            match declaration {
                Declaration::Class(class) => self.write_class(out, class),
                Declaration::Enum(descriptor) => write_enum(out, descriptor),
            }
        }
        for declaration in declarations {
            if declaration.nested().is_empty() {
                continue;
            }
            out.gap();
            out.open(&format!(
                "pub mod {} {{",
                module_name(declaration.name().simple_name())
            ));
            self.write_nested(out, declaration.nested());
            out.close("}");
        }
    }

    /// Absolute path of a generated type.
    fn type_path(&self, name: &QualifiedName) -> String {
        let mut segments: Vec<String> = vec!["crate".to_string()];
        segments.extend(name.package().iter().map(|s| module_name(s)));
        if let Some((simple, enclosing)) = name.names().split_last() {
            segments.extend(enclosing.iter().map(|n| module_name(n)));
            segments.push(type_name(simple));
        }
        segments.join("::")
    }

    fn rust_type(&self, ty: &TypeDescriptor) -> String {
        let rt: &str = &self.runtime_crate;
        match ty {
            TypeDescriptor::Named(name) => self.type_path(name),
            TypeDescriptor::Runtime(runtime) => match runtime {
                RuntimeType::Client => format!("{rt}::Client"),
                RuntimeType::Request => format!("{rt}::ClientRequest"),
                RuntimeType::HttpMethod => format!("{rt}::Method"),
                RuntimeType::ResponseType => "std::marker::PhantomData".to_string(),
                RuntimeType::Content => format!("Option<{rt}::Content>"),
            },
            TypeDescriptor::Primitive(primitive) => match primitive {
                Primitive::String => "String".to_string(),
                Primitive::Boolean => "bool".to_string(),
                Primitive::Int32 => "i32".to_string(),
                Primitive::Int64 => "i64".to_string(),
                Primitive::Float32 => "f32".to_string(),
                Primitive::Float64 => "f64".to_string(),
                Primitive::Date => format!("{rt}::Date"),
                Primitive::DateTime => format!("{rt}::DateTime"),
                Primitive::TimeZone => format!("{rt}::TimeZone"),
                Primitive::Any => "serde_json::Value".to_string(),
            },
            TypeDescriptor::List(item) => format!("Vec<{}>", self.rust_type(item)),
            TypeDescriptor::Map(value) => format!(
                "std::collections::BTreeMap<String, {}>",
                self.rust_type(value)
            ),
            TypeDescriptor::Parameterized { raw, args } => {
                let args: Vec<String> = args.iter().map(|a| self.rust_type(a)).collect();
                format!("{}<{}>", self.rust_type(raw), args.join(", "))
            }
            TypeDescriptor::Variable(name) => name.clone(),
            TypeDescriptor::Void => "()".to_string(),
        }
    }

    /// The type without its generic arguments, for constructor calls.
    fn raw_type(&self, ty: &TypeDescriptor) -> String {
        match ty {
            TypeDescriptor::Parameterized { raw, .. } => self.rust_type(raw),
            other => self.rust_type(other),
        }
    }

    fn write_class(&self, out: &mut SourceWriter, class: &ClassDescriptor) {
        match class.kind {
            ClassKind::Model => self.write_model(out, class),
            ClassKind::Component | ClassKind::Client | ClassKind::RequestBase => {
                self.write_service(out, class);
            }
        }
    }

    fn write_model(&self, out: &mut SourceWriter, class: &ClassDescriptor) {
        out.gap();
        emit_doc_comment(out, class.documentation.as_deref());
        out.line("#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]");
        out.open(&format!("pub struct {} {{", type_name(class.name.simple_name())));
        for field in &class.fields {
            self.write_model_field(out, field);
        }
        out.close("}");
    }

    fn write_model_field(&self, out: &mut SourceWriter, field: &FieldDescriptor) {
        let name: String = field_name(&field.identifier);
        let wire_name: &str = field.identifier.wire_name();
        let mut serde_args: Vec<String> = Vec::new();
        if name != wire_name {
            serde_args.push(format!("rename = \"{}\"", escape_for_rust_attr(wire_name)));
        }
        if field.serialization_override == Some(SerializationOverride::Rfc3339Timestamp)
            && field.ty == TypeDescriptor::Primitive(Primitive::DateTime)
        {
            serde_args.push("default".to_string());
            serde_args.push(format!("with = \"{}::rfc3339::option\"", self.runtime_crate));
        }
        serde_args.push("skip_serializing_if = \"Option::is_none\"".to_string());

        emit_doc_comment(out, field.documentation.as_deref());
        out.line(&format!("#[serde({})]", serde_args.join(", ")));
        out.line(&format!("pub {name}: Option<{}>,", self.rust_type(&field.ty)));
    }

    /// Client, request base type or resource/method component.
    fn write_service(&self, out: &mut SourceWriter, class: &ClassDescriptor) {
        let name: String = type_name(class.name.simple_name());
        let generics: String = if class.type_parameters.is_empty() {
            String::new()
        } else {
            format!("<{}>", class.type_parameters.join(", "))
        };

        out.gap();
        emit_doc_comment(out, class.documentation.as_deref());
        out.line("#[derive(Debug, Clone)]");
        out.open(&format!("pub struct {name}{generics} {{"));
        if class.kind == ClassKind::Component {
            out.line(&format!("{CLIENT_FIELD}: {}::Client,", self.runtime_crate));
        }
        if let Some(ref base) = class.super_type {
            out.line(&format!("{BASE_FIELD}: {},", self.rust_type(base)));
        }
        for field in &class.fields {
            emit_doc_comment(out, field.documentation.as_deref());
            out.line(&format!(
                "{}: {},",
                field_name(&field.identifier),
                self.field_type(field)
            ));
        }
        out.close("}");

        out.gap();
        out.open(&format!("impl{generics} {name}{generics} {{"));
        if !class.constants.is_empty() {
            out.gap();
            for constant in &class.constants {
                out.line(&format!(
                    "pub const {}: &str = \"{}\";",
                    constant.name,
                    escape_for_rust_attr(&constant_value(class, constant))
                ));
            }
        }
        if class.kind == ClassKind::Client {
            self.write_client_constructor(out);
        }
        for constructor in &class.constructors {
            self.write_constructor(out, class, constructor);
        }
        self.write_accessors(out, class);
        if class.kind == ClassKind::RequestBase || extends_generated_request(class) {
            write_parameters(out, class);
        }
        self.write_factories(out, class);
        out.close("}");
    }

    fn field_type(&self, field: &FieldDescriptor) -> String {
        let ty: String = self.rust_type(&field.ty);
        if field.required {
            ty
        } else {
            format!("Option<{ty}>")
        }
    }

    fn write_client_constructor(&self, out: &mut SourceWriter) {
        out.gap();
        out.line("/// Creates the client on top of a configured runtime client.");
        out.open(&format!(
            "pub fn new(base: {}::Client) -> Self {{",
            self.runtime_crate
        ));
        out.line(&format!("Self {{ {BASE_FIELD}: base }}"));
        out.close("}");
    }

    fn write_constructor(
        &self,
        out: &mut SourceWriter,
        class: &ClassDescriptor,
        constructor: &ConstructorDescriptor,
    ) {
        let rt: &str = &self.runtime_crate;
        let mut params: Vec<String> = Vec::with_capacity(constructor.params.len() + 1);
        if class.kind == ClassKind::Component {
            params.push(format!("{CLIENT_FIELD}: {rt}::Client"));
        }
        params.extend(
            constructor
                .params
                .iter()
                .map(|p| format!("{}: {}", field_name(&p.identifier), self.rust_type(&p.ty))),
        );
        let fallible: bool = constructor_returns_result(constructor);
        let returns: String = if fallible {
            format!("Result<Self, {rt}::Error>")
        } else {
            "Self".to_string()
        };

        out.gap();
        out.open(&format!(
            "pub fn {}({}) -> {returns} {{",
            constructor.name,
            params.join(", ")
        ));
        let mut has_base: bool = false;
        for statement in &constructor.body {
            match statement {
                Statement::ForwardToBase { args } => {
                    let Some(ref base) = class.super_type else {
                        continue;
                    };
                    let args: Vec<String> = args
                        .iter()
                        .enumerate()
                        .map(|(index, arg)| self.render_arg(arg, index, &constructor.params))
                        .collect();
                    let base_constructor: &str =
                        BASE_REQUEST.primary_constructor().map_or("new", |c| c.name);
                    out.line(&format!(
                        "let {BASE_FIELD} = {}::{base_constructor}({});",
                        self.raw_type(base),
                        args.join(", ")
                    ));
                    has_base = true;
                }
                Statement::RequireNonNull { field, message } => {
                    let name: String = field_name(field);
                    out.line(&format!(
                        "let {name} = {rt}::require({name}, \"{}\")?;",
                        escape_for_rust_attr(message)
                    ));
                }
            }
        }

        let mut inits: Vec<String> = Vec::with_capacity(class.fields.len() + 2);
        if class.kind == ClassKind::Component {
            inits.push(CLIENT_FIELD.to_string());
        }
        if has_base {
            inits.push(BASE_FIELD.to_string());
        }
        for field in &class.fields {
            let name: String = field_name(&field.identifier);
            if field.required {
                inits.push(name);
            } else {
                inits.push(format!("{name}: None"));
            }
        }
        let value: String = if inits.is_empty() {
            "Self {}".to_string()
        } else {
            format!("Self {{ {} }}", inits.join(", "))
        };
        if fallible {
            out.line(&format!("Ok({value})"));
        } else {
            out.line(&value);
        }
        out.close("}");
    }

    fn render_arg(&self, arg: &Expr, index: usize, params: &[ParamDescriptor]) -> String {
        let rt: &str = &self.runtime_crate;
        match arg {
            Expr::ClientInstance => format!("{CLIENT_FIELD}.clone()"),
            Expr::TypeLiteral(ty) => format!("std::marker::PhantomData::<{}>", self.rust_type(ty)),
            Expr::HttpVerb(verb) => format!("{rt}::Method::{}", verb.to_uppercase()),
            Expr::Constant(name) => format!("Self::{name}.to_string()"),
            Expr::Param(identifier) => {
                let name: String = field_name(identifier);
                if wraps_content(arg, index, params) {
                    format!("Some({rt}::Content::json(&{name})?)")
                } else {
                    name
                }
            }
            Expr::Absent => "None".to_string(),
        }
    }

    fn write_accessors(&self, out: &mut SourceWriter, class: &ClassDescriptor) {
        if let Some(ref base) = class.super_type {
            let ty: String = self.rust_type(base);
            out.gap();
            out.open(&format!("pub fn {BASE_FIELD}(&self) -> &{ty} {{"));
            out.line(&format!("&self.{BASE_FIELD}"));
            out.close("}");
            out.gap();
            out.open(&format!("pub fn base_mut__(&mut self) -> &mut {ty} {{"));
            out.line(&format!("&mut self.{BASE_FIELD}"));
            out.close("}");
        }

        for field in &class.fields {
            let name: String = field_name(&field.identifier);
            let ty: String = self.rust_type(&field.ty);
            out.gap();
            emit_doc_comment(out, field.documentation.as_deref());
            if field.required {
                out.open(&format!("pub fn {name}(&self) -> &{ty} {{"));
                out.line(&format!("&self.{name}"));
                out.close("}");
                continue;
            }
            out.open(&format!("pub fn {name}(&self) -> Option<&{ty}> {{"));
            out.line(&format!("self.{name}.as_ref()"));
            out.close("}");

            out.gap();
            out.open(&format!(
                "pub fn set_{}(&mut self, {name}: {ty}) -> &mut Self {{",
                name.trim_end_matches(COLLISION_SUFFIX)
            ));
            out.line(&format!("self.{name} = Some({name});"));
            out.line("self");
            out.close("}");
        }
    }

    fn write_factories(&self, out: &mut SourceWriter, class: &ClassDescriptor) {
        let client: String = if class.kind == ClassKind::Client {
            format!("self.{BASE_FIELD}.clone()")
        } else {
            format!("self.{CLIENT_FIELD}.clone()")
        };
        for factory in &class.factories {
            let target: String = self.type_path(&factory.returns);
            let fallible: bool = class
                .nested_class(factory.returns.simple_name())
                .and_then(|c| c.constructors.first())
                .is_some_and(constructor_returns_result);
            let returns: String = if fallible {
                format!("Result<{target}, {}::Error>", self.runtime_crate)
            } else {
                target.clone()
            };
            let params: Vec<String> = factory
                .params
                .iter()
                .map(|p| format!("{}: {}", field_name(&p.identifier), self.rust_type(&p.ty)))
                .collect();
            let args: Vec<String> = std::iter::once(client.clone())
                .chain(factory.params.iter().map(|p| field_name(&p.identifier)))
                .collect();

            out.gap();
            emit_doc_comment(out, factory.documentation.as_deref());
            out.open(&format!(
                "pub fn {}(&self{}) -> {returns} {{",
                field_name(&factory.name),
                params.iter().map(|p| format!(", {p}")).collect::<String>()
            ));
            out.line(&format!("{target}::new({})", args.join(", ")));
            out.close("}");
        }
    }

    fn package_index(modules: &[(String, String)]) -> String {
        let mut out: SourceWriter = SourceWriter::default();
        out.line(HEADER);
        out.gap();
        for (module, _) in modules {
            out.line(&format!("pub mod {module};"));
        }
        let reexports: Vec<&(String, String)> =
            modules.iter().filter(|(_, ty)| !ty.is_empty()).collect();
        if !reexports.is_empty() {
            out.gap();
            for (module, ty) in reexports {
                out.line(&format!("pub use {module}::{ty};"));
            }
        }
        out.finish()
    }
}

/// `(module, type)` pair of a top-level class.
fn class_module(class: &ClassDescriptor) -> (String, String) {
    let simple: &str = class.name.simple_name();
    (module_name(simple), type_name(simple))
}

fn write_reexports<'a>(out: &mut SourceWriter, classes: impl Iterator<Item = &'a ClassDescriptor>) {
    let mut first: bool = true;
    for class in classes {
        if first {
            out.gap();
            first = false;
        }
        let (module, ty) = class_module(class);
        out.line(&format!("pub use {module}::{ty};"));
    }
}

/// Emit a single enum.
fn write_enum(out: &mut SourceWriter, descriptor: &EnumDescriptor) {
    out.gap();
    emit_doc_comment(out, descriptor.documentation.as_deref());
    out.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]");
    out.open(&format!("pub enum {} {{", type_name(descriptor.name.simple_name())));
    for (rust_name, constant) in build_enum_variants(&descriptor.constants) {
        emit_doc_comment(out, constant.documentation.as_deref());
        out.line(&format!(
            "#[serde(rename = \"{}\")]",
            escape_for_rust_attr(constant.identifier.wire_name())
        ));
        out.line(&format!("{rust_name},"));
    }
    out.close("}");
}

/// `parameters()`: key fields by wire name, after those of the base request.
fn write_parameters(out: &mut SourceWriter, class: &ClassDescriptor) {
    let key_fields: Vec<&FieldDescriptor> = class.fields.iter().filter(|f| f.key).collect();
    let inherits: bool = extends_generated_request(class);

    out.gap();
    out.line("/// Request parameters sent on the wire, by wire name.");
    out.open(
        "pub fn parameters(&self) -> Result<Vec<(&'static str, serde_json::Value)>, serde_json::Error> {",
    );
    if key_fields.is_empty() {
        out.line(&if inherits {
            format!("self.{BASE_FIELD}.parameters()")
        } else {
            "Ok(Vec::new())".to_string()
        });
        out.close("}");
        return;
    }

    let init: String = if inherits {
        format!("self.{BASE_FIELD}.parameters()?")
    } else {
        "Vec::new()".to_string()
    };
    out.line(&format!(
        "let mut parameters: Vec<(&'static str, serde_json::Value)> = {init};"
    ));
    for field in key_fields {
        let name: String = field_name(&field.identifier);
        let wire_name: String = escape_for_rust_attr(field.identifier.wire_name());
        if field.required {
            out.line(&format!(
                "parameters.push((\"{wire_name}\", serde_json::to_value(&self.{name})?));"
            ));
        } else {
            out.open(&format!("if let Some(ref value) = self.{name} {{"));
            out.line(&format!(
                "parameters.push((\"{wire_name}\", serde_json::to_value(value)?));"
            ));
            out.close("}");
        }
    }
    out.line("Ok(parameters)");
    out.close("}");
}

impl Renderer for RustRenderer {
    fn render(&self, api: &GeneratedApi) -> Vec<SourceUnit> {
        let package: PathBuf = package_dir(&api.package);
        let model_package: PathBuf = package_dir(&api.model_package);
        let mut units: Vec<SourceUnit> = Vec::with_capacity(api.models.len() + 4);

        let mut api_modules: Vec<(String, String)> = Vec::with_capacity(3);
        if let Some(model) = api.model_package.last() {
            api_modules.push((module_name(model), String::new()));
        }
        for class in [&api.request, &api.client] {
            let (module, ty) = class_module(class);
            units.push(SourceUnit {
                path: package.join(format!("{module}.rs")),
                contents: self.class_file(class),
            });
            api_modules.push((module, ty));
        }
        units.push(SourceUnit {
            path: package.join("mod.rs"),
            contents: Self::package_index(&api_modules),
        });

        let mut model_modules: Vec<(String, String)> = Vec::with_capacity(api.models.len());
        for model in &api.models {
            let (module, ty) = class_module(model);
            units.push(SourceUnit {
                path: model_package.join(format!("{module}.rs")),
                contents: self.class_file(model),
            });
            model_modules.push((module, ty));
        }
        units.push(SourceUnit {
            path: model_package.join("mod.rs"),
            contents: Self::package_index(&model_modules),
        });
        units
    }

    fn render_index(&self, base_package: &[String], apis: &[GeneratedApi]) -> Vec<SourceUnit> {
        let segments: Vec<String> = base_package.iter().map(|s| module_name(s)).collect();
        let mut api_modules: Vec<String> = apis
            .iter()
            .filter_map(|api| api.package.last())
            .map(|s| module_name(s))
            .collect();
        api_modules.sort();
        api_modules.dedup();

        let index = |children: Vec<String>| -> String {
            let modules: Vec<(String, String)> =
                children.into_iter().map(|m| (m, String::new())).collect();
            Self::package_index(&modules)
        };

        if segments.is_empty() {
            return vec![SourceUnit {
                path: PathBuf::from("mod.rs"),
                contents: index(api_modules),
            }];
        }
        (0..segments.len())
            .map(|depth| {
                let children: Vec<String> = segments
                    .get(depth + 1)
                    .map_or_else(|| api_modules.clone(), |child| vec![child.clone()]);
                SourceUnit {
                    path: segments[..=depth].iter().collect::<PathBuf>().join("mod.rs"),
                    contents: index(children),
                }
            })
            .collect()
    }
}
