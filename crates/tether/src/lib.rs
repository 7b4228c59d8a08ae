//! Tether: reactive value synchronization for game objects and tooling.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Tether sub-crates. For most users, adding `tether` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::rc::Rc;
//! use tether::prelude::*;
//!
//! // One registry shared by every bind.
//! let registry = Rc::new(default_registry());
//! let bind = Bind::new("player.health", registry);
//!
//! // A health slot that pushes its value when attached.
//! let health = Bindable::new(
//!     BindableConfig::new(ConnectionType::Sender).on_attach(OnAttachBehavior::PushValue),
//!     FnAccessor::new(ValueType::Int, || Value::Int(75), |_| Ok(())),
//! )
//! .unwrap();
//!
//! // A label that formats whatever it receives.
//! let label = Rc::new(std::cell::RefCell::new(String::new()));
//! let sink = Rc::clone(&label);
//! let text = Bindable::receiver(FnAccessor::new(
//!     ValueType::String,
//!     || Value::Null,
//!     move |v| {
//!         *sink.borrow_mut() = v.to_string();
//!         Ok(())
//!     },
//! ))
//! .with_transformer(Transformer::single(Format::new("HP {}")));
//!
//! text.attach(&bind);
//! health.attach(&bind);
//! assert_eq!(*label.borrow(), "HP 75");
//!
//! health.report_change(Value::Int(40));
//! assert_eq!(*label.borrow(), "HP 40");
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tether-core` | Values, type tags, ids, `Accessor`, errors |
//! | [`convert`] | `tether-convert` | `Converter` trait, registry, transformer pipeline |
//! | [`converters`] | `tether-converters` | Built-in converters and transforms |
//! | [`engine`] | `tether-engine` | Binds, bindables, tickers, scheduler, directory |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and ids (`tether-core`).
///
/// Contains [`types::Value`], [`types::ValueType`], the
/// [`types::Accessor`] capability, and the error types.
pub use tether_core as types;

/// Converter trait, registry, and transformer pipeline (`tether-convert`).
///
/// Implement [`convert::Converter`] to add a conversion and
/// [`convert::Transform`] to add a post-processing stage.
pub use tether_convert as convert;

/// Built-in converters and transforms (`tether-converters`).
///
/// [`converters::default_registry`] builds a registry holding every
/// auto-registered converter.
pub use tether_converters as converters;

/// Propagation engine (`tether-engine`).
///
/// [`engine::Bind`] hubs, [`engine::Bindable`] endpoints, and the
/// host-driven [`engine::TickScheduler`].
pub use tether_engine as engine;

/// Common imports for typical Tether usage.
///
/// ```rust
/// use tether::prelude::*;
/// ```
///
/// This imports the most frequently used types: values, accessors, the
/// registry and transformer, built-in transforms, and the engine's binds,
/// endpoints, and configuration.
pub mod prelude {
    // Core types and traits
    pub use tether_core::{Accessor, EnumDef, FnAccessor, Value, ValueKind, ValueType};

    // Errors
    pub use tether_core::{EdgeError, RegistryError, WriteRejected};

    // Conversion
    pub use tether_convert::{Converter, ConverterRegistry, Transform, Transformer};
    pub use tether_converters::{
        default_registry, Clamp, Format, MapTransform, Negate, Offset, Round, Scale,
    };

    // Engine
    pub use tether_engine::{
        Bind, BindDirectory, BindOptions, Bindable, BindableConfig, ConfigError, ConnectionType,
        NotifyOutcome, OnAttachBehavior, PropagationObserver, PulseError, TickScheduler,
        TickerConfig, TickerMode,
    };
}
