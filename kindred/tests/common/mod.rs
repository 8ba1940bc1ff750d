#![allow(dead_code)]

use kindred::{Cancellable, Cloneable, Exclusive, Kind, Scoped, prelude::*};

// ============================================================================
// Abstract Kinds
// ============================================================================

/// Events that keep a trail of which processors touched them.
pub trait Traced {
    fn trail(&self) -> &[&'static str];
    fn mark(&mut self, step: &'static str);
}

/// Declare abstract kinds viewing `dyn Traced`.
macro_rules! traced_kinds {
    ($($name:ident: ($($parent:ty),*);)*) => {$(
        pub struct $name;

        impl Kind for $name {
            type View = dyn Traced;
            type Parents = ($($parent,)*);

            fn name() -> &'static str {
                stringify!($name)
            }
        }
    )*};
}

traced_kinds! {
    Root: ();
    Left: (Root);
    Right: (Root);
}

traced_kinds! {
    E0: ();
    E1: (E0);
    E2: (E0);
    E3: (E0);
    E4: (E0);
    E5: (E1, E2);
    E6: (E3, E4);
}

// ============================================================================
// Test Event Types
// ============================================================================

/// Bottom of the Root/Left/Right diamond.
#[derive(Debug, Default, Event)]
#[event(parents(Left, Right), coerce(Root, Left, Right))]
pub struct Diamond {
    pub trail: Vec<&'static str>,
}

impl Traced for Diamond {
    fn trail(&self) -> &[&'static str] {
        &self.trail
    }

    fn mark(&mut self, step: &'static str) {
        self.trail.push(step);
    }
}

/// Bottom of the E0..E7 lattice.
#[derive(Debug, Default, Event)]
#[event(parents(E5, E6), coerce(E0, E1, E2, E3, E4, E5, E6))]
pub struct E7 {
    pub trail: Vec<&'static str>,
}

impl Traced for E7 {
    fn trail(&self) -> &[&'static str] {
        &self.trail
    }

    fn mark(&mut self, step: &'static str) {
        self.trail.push(step);
    }
}

/// A chat line: cancellable, cloneable and context-scoped.
#[derive(Debug, Clone, Default, Event)]
#[event(parents(Cancellable, Cloneable, Scoped), coerce(Cloneable))]
pub struct Chat {
    #[extends]
    pub cancel: Cancellable,
    #[extends]
    pub scope: Scoped,
    pub text: String,
}

impl Chat {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            ..Default::default()
        }
    }

    pub fn scoped(context: kindred::ContextId, text: &str) -> Self {
        Self {
            scope: Scoped::new(context),
            ..Self::new(text)
        }
    }
}

/// Work handed to exactly one reactor, unless cancelled first.
#[derive(Debug, Default, Event)]
#[event(parents(Cancellable, Exclusive))]
pub struct Task {
    #[extends]
    pub cancel: Cancellable,
    #[extends]
    pub owner: Exclusive,
    pub name: &'static str,
}

/// Plain root event with a counter payload.
#[derive(Debug, Clone, Default, PartialEq, Event)]
pub struct Tick {
    pub count: u32,
}

/// A second plain event, used for nested dispatch.
#[derive(Debug, Clone, Default, PartialEq, Event)]
#[event(name = "Echo")]
pub struct Echo {
    pub depth: u32,
}
