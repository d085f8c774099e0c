//! Resource/method component classes.
//!
//! Each resource and each method becomes a class nested in its parent, plus a
//! factory method on the parent that constructs it. Components under
//! construction live on an explicit stack: [`ComponentStack::open`] pushes a
//! new class and hands out a [`ComponentHandle`]; [`ComponentStack::close`]
//! finalizes the top class into its parent. A handle can only be closed once
//! and only while it is the innermost open one.
//!
//! [`ComponentStack::scoped`] pairs the two so the component is finalized on
//! every exit path, including errors raised while its children are added.

use crate::descriptor::{
    ClassDescriptor, ClassKind, ConstructorDescriptor, Declaration, FactoryMethod,
    FieldDescriptor, ParamDescriptor, QualifiedName, Statement, escape_doc,
};
use crate::error::CodegenError;
use crate::identifier::Identifier;
use tracing::debug;

/// What a component is called and which parameters its constructor takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSpec {
    pub name: Identifier,
    pub documentation: Option<String>,
    /// Request body, passed after the required parameters.
    pub body: Option<ParamDescriptor>,
    /// Required parameters, in call order.
    pub required: Vec<ParamDescriptor>,
}

impl ComponentSpec {
    /// A component without parameters, such as a resource.
    #[must_use]
    pub fn named(name: Identifier) -> Self {
        Self {
            name,
            documentation: None,
            body: None,
            required: Vec::new(),
        }
    }

    /// Constructor and factory parameters: required ones, then the body.
    #[must_use]
    pub fn all_params(&self) -> Vec<ParamDescriptor> {
        self.required.iter().chain(self.body.iter()).cloned().collect()
    }
}

/// Proof that a component is open. Consumed by [`ComponentStack::close`].
#[derive(Debug)]
#[must_use = "an open component must be closed"]
pub struct ComponentHandle {
    depth: usize,
    name: String,
}

#[derive(Debug)]
struct OpenComponent {
    spec: ComponentSpec,
    class: ClassDescriptor,
    constructor: ConstructorDescriptor,
}

impl OpenComponent {
    /// Adds fields and null checks for the parameters, then attaches the class
    /// and its factory method to `parent`.
    fn finalize_into(self, parent: &mut ClassDescriptor) {
        let Self {
            spec,
            mut class,
            mut constructor,
        } = self;

        for param in &spec.required {
            add_required_field(&mut class, &mut constructor, param, true);
        }
        if let Some(ref body) = spec.body {
            add_required_field(&mut class, &mut constructor, body, false);
        }
        class.constructors.push(constructor);

        let factory: FactoryMethod = FactoryMethod {
            params: spec.all_params(),
            name: spec.name,
            returns: class.name.clone(),
            documentation: spec.documentation.as_deref().map(escape_doc),
        };
        parent.nested.push(Declaration::Class(class));
        parent.factories.push(factory);
    }
}

fn add_required_field(
    class: &mut ClassDescriptor,
    constructor: &mut ConstructorDescriptor,
    param: &ParamDescriptor,
    key: bool,
) {
    let mut field: FieldDescriptor = FieldDescriptor::new(param.identifier.clone(), param.ty.clone());
    field.required = true;
    field.key = key;
    class.fields.push(field);
    constructor.body.push(Statement::RequireNonNull {
        field: param.identifier.clone(),
        message: format!(
            "Required parameter {} must be specified.",
            param.identifier.name()
        ),
    });
}

/// Stack of components under construction above a root class.
#[derive(Debug)]
pub struct ComponentStack {
    root: ClassDescriptor,
    open: Vec<OpenComponent>,
}

impl ComponentStack {
    #[must_use]
    pub fn new(root: ClassDescriptor) -> Self {
        Self {
            root,
            open: Vec::new(),
        }
    }

    /// Number of open components.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// The innermost class under construction (the root when none is open).
    #[must_use]
    pub fn current_class(&self) -> &ClassDescriptor {
        self.open.last().map_or(&self.root, |c| &c.class)
    }

    pub fn current_class_mut(&mut self) -> &mut ClassDescriptor {
        match self.open.last_mut() {
            Some(component) => &mut component.class,
            None => &mut self.root,
        }
    }

    /// Constructor of the innermost open component; `None` at the root.
    pub fn current_constructor_mut(&mut self) -> Option<&mut ConstructorDescriptor> {
        self.open.last_mut().map(|c| &mut c.constructor)
    }

    /// Name the component `name` gets when opened in the current class.
    #[must_use]
    pub fn child_name(&self, name: &Identifier) -> QualifiedName {
        self.current_class().name.nested(name.to_type_name())
    }

    /// Opens a component nested in the current class.
    pub fn open(&mut self, spec: ComponentSpec) -> ComponentHandle {
        let name: QualifiedName = self.child_name(&spec.name);
        debug!(component = %name, depth = self.open.len() + 1, "opening component");
        let class: ClassDescriptor = ClassDescriptor::new(name.clone(), ClassKind::Component);
        let constructor: ConstructorDescriptor =
            ConstructorDescriptor::new("new", spec.all_params());
        self.open.push(OpenComponent {
            spec,
            class,
            constructor,
        });
        ComponentHandle {
            depth: self.open.len(),
            name: name.to_string(),
        }
    }

    /// Finalizes the component of `handle` into its parent.
    ///
    /// # Errors
    ///
    /// Returns `CodegenError::HandleOutOfOrder` if a component opened after
    /// `handle` is still open; nothing is finalized in that case.
    pub fn close(&mut self, handle: ComponentHandle) -> Result<(), CodegenError> {
        if handle.depth != self.open.len() {
            return Err(CodegenError::HandleOutOfOrder {
                name: handle.name,
                open: self.open.len().saturating_sub(handle.depth),
            });
        }
        let Some(component) = self.open.pop() else {
            return Err(CodegenError::HandleOutOfOrder {
                name: handle.name,
                open: 0,
            });
        };
        debug!(component = %handle.name, "closing component");
        component.finalize_into(self.current_class_mut());
        Ok(())
    }

    /// Opens a component, runs `build` for its children, and closes it whether
    /// or not `build` succeeds. The first error wins.
    ///
    /// # Errors
    ///
    /// Returns the error of `build`, or of closing the component.
    pub fn scoped<F>(&mut self, spec: ComponentSpec, build: F) -> Result<(), CodegenError>
    where
        F: FnOnce(&mut Self) -> Result<(), CodegenError>,
    {
        let handle: ComponentHandle = self.open(spec);
        let built: Result<(), CodegenError> = build(self);
        let closed: Result<(), CodegenError> = self.close(handle);
        built.and(closed)
    }

    /// Returns the root class once every component is closed.
    ///
    /// # Errors
    ///
    /// Returns `CodegenError::UnclosedHandles` if components are still open.
    pub fn finish(self) -> Result<ClassDescriptor, CodegenError> {
        if self.open.is_empty() {
            Ok(self.root)
        } else {
            Err(CodegenError::UnclosedHandles {
                open: self.open.len(),
            })
        }
    }
}
