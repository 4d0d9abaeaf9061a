/// Declares a model: a newtype over [`Record`](crate::model::Record) with its
/// [`Schema`](crate::model::Schema) and typed accessors.
///
/// ```ignore
/// model! {
///     pub struct Meeting {
///         identity: "meeting_id",
///         properties {
///             meeting_id: Integer,
///             starts_on: Datetime [ConvertIncomingToUtc],
///             reference: Hash as "ref",
///         }
///         has_one {
///             created_by: User,
///         }
///         has_many {
///             participants: MeetingParticipant,
///         }
///     }
/// }
/// ```
///
/// Every property gets a getter typed by its kind and a `set_<name>` setter. Array
/// properties take `plural <name>` for a synonym and `default <singular>` for
/// `default_<singular>()` and `set_default_<singular>()`, e.g.
/// `mail: Array plural mails default mail`.
/// has_one associations get `<name>()` and `clear_<name>()`, has_many associations
/// `<name>()` and `has_<name>()`. `computed` entries are readable by name and included
/// in formatted JSON.
#[macro_export]
macro_rules! model {
    (
        $(#[$outer:meta])*
        $vis:vis struct $name:ident {
            $(identity: $identity:literal,)?
            properties {
                $(
                    $(#[$property_meta:meta])*
                    $property:ident : $kind:ident $([$($option:ident),+ $(,)?])? $(as $key:literal)?
                    $(plural $plural:ident)? $(default $default:ident)?
                ),* $(,)?
            }
            $(has_one {
                $($one:ident : $one_class:ident $(as $one_key:literal)?),* $(,)?
            })?
            $(has_many {
                $($many:ident : $many_class:ident $(as $many_key:literal)?),* $(,)?
            })?
            $(computed {
                $($computed:ident => $read:path),* $(,)?
            })?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name {
            record: $crate::model::Record,
        }

        impl $crate::model::Model for $name {
            fn schema() -> &'static $crate::model::Schema {
                static SCHEMA: ::std::sync::LazyLock<$crate::model::Schema> =
                    ::std::sync::LazyLock::new(|| {
                        $crate::model::Schema::builder(stringify!($name))
                            $(.identity($identity))?
                            $(
                                .property_with(
                                    $crate::model!(@key $property $($key)?),
                                    $crate::model::AttributeKind::$kind,
                                    &[$($($crate::model::AttributeOption::$option),+)?],
                                )
                            )*
                            $($(
                                .has_one_as(
                                    stringify!($one),
                                    stringify!($one_class),
                                    $crate::model!(@key $one $($one_key)?),
                                )
                            )*)?
                            $($(
                                .has_many_as(
                                    stringify!($many),
                                    stringify!($many_class),
                                    $crate::model!(@key $many $($many_key)?),
                                )
                            )*)?
                            $($(
                                .computed(stringify!($computed), $read)
                                .output_as_json(stringify!($computed))
                            )*)?
                            .build()
                    });

                &SCHEMA
            }

            fn from_record(record: $crate::model::Record) -> Self {
                Self { record }
            }

            fn record(&self) -> &$crate::model::Record {
                &self.record
            }
        }

        impl $name {
            $(
                $crate::model!(
                    @property [$(#[$property_meta])*]
                    $kind $property [$($plural)?] [$($default)?]
                    $crate::model!(@key $property $($key)?)
                );
            )*

            $($(
                $crate::model!(@has_one $one $one_class);
            )*)?

            $($(
                $crate::model!(@has_many $many $many_class);
            )*)?
        }
    };

    (@key $name:ident) => { stringify!($name) };
    (@key $name:ident $key:literal) => { $key };

    (@property [$(#[$meta:meta])*] String $name:ident [] [] $key:expr) => {
        $(#[$meta])*
        pub fn $name(&self) -> Option<String> {
            self.record.string($key)
        }

        $crate::model!(@setter $name $key);
    };

    (@property [$(#[$meta:meta])*] Integer $name:ident [] [] $key:expr) => {
        $(#[$meta])*
        pub fn $name(&self) -> Option<i64> {
            self.record.integer($key)
        }

        $crate::model!(@setter $name $key);
    };

    (@property [$(#[$meta:meta])*] Boolean $name:ident [] [] $key:expr) => {
        $(#[$meta])*
        pub fn $name(&self) -> Option<bool> {
            self.record.boolean($key)
        }

        $crate::model!(@setter $name $key);
    };

    (@property [$(#[$meta:meta])*] Date $name:ident [] [] $key:expr) => {
        $(#[$meta])*
        pub fn $name(&self) -> Option<::chrono::NaiveDate> {
            self.record.date($key)
        }

        $crate::paste::paste! {
            pub fn [<set_ $name>](&self, date: ::chrono::NaiveDate) -> $crate::Result<()> {
                self.record.set_date($key, date)
            }
        }
    };

    (@property [$(#[$meta:meta])*] Datetime $name:ident [] [] $key:expr) => {
        $(#[$meta])*
        pub fn $name(&self) -> Option<$crate::model::Timestamp> {
            self.record.datetime($key)
        }

        $crate::paste::paste! {
            pub fn [<set_ $name>]<Tz: ::chrono::TimeZone>(
                &self,
                datetime: ::chrono::DateTime<Tz>,
            ) -> $crate::Result<()> {
                self.record.set_datetime($key, datetime)
            }
        }
    };

    (@property
        [$(#[$meta:meta])*] Array $name:ident
        [$($plural:ident)?] [$($default:ident)?] $key:expr
    ) => {
        $(#[$meta])*
        pub fn $name(&self) -> Vec<::serde_json::Value> {
            self.record.array($key)
        }

        $crate::model!(@setter $name $key);

        $(
            pub fn $plural(&self) -> Vec<::serde_json::Value> {
                self.record.array($key)
            }

            $crate::model!(@setter $plural $key);
        )?

        $(
            $crate::paste::paste! {
                /// First element, if present.
                pub fn [<default_ $default>](&self) -> Option<::serde_json::Value> {
                    self.record.default_element($key)
                }

                pub fn [<set_default_ $default>](
                    &self,
                    value: impl Into<::serde_json::Value>,
                ) -> $crate::Result<()> {
                    self.record.set_default_element($key, value)
                }
            }
        )?
    };

    (@property [$(#[$meta:meta])*] Hash $name:ident [] [] $key:expr) => {
        $(#[$meta])*
        pub fn $name(&self) -> Option<::serde_json::Map<String, ::serde_json::Value>> {
            self.record.hash($key)
        }

        $crate::model!(@setter $name $key);
    };

    (@setter $name:ident $key:expr) => {
        $crate::paste::paste! {
            pub fn [<set_ $name>](&self, value: impl Into<::serde_json::Value>) -> $crate::Result<()> {
                self.record.set($key, value)
            }
        }
    };

    (@has_one $name:ident $class:ident) => {
        pub fn $name(&self) -> $crate::Result<Option<$class>> {
            let record = self.record.single(stringify!($name))?;
            Ok(record.map(<$class as $crate::model::Model>::from_record))
        }

        $crate::paste::paste! {
            pub fn [<clear_ $name>](&self) -> $crate::Result<()> {
                self.record.clear_single(stringify!($name))
            }
        }
    };

    (@has_many $name:ident $class:ident) => {
        pub fn $name(&self) -> $crate::Result<Vec<$class>> {
            let records = self.record.many(stringify!($name))?;
            Ok(records
                .into_iter()
                .map(<$class as $crate::model::Model>::from_record)
                .collect())
        }

        $crate::paste::paste! {
            pub fn [<has_ $name>](&self) -> $crate::Result<bool> {
                self.record.has_many_present(stringify!($name))
            }
        }
    };
}
