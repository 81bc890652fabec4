/// Implements `PersistObject` for an existing struct by listing its
/// persistable fields.
///
/// ```ignore
/// persist_object! {
///     Town extends base: TownyObject {
///         name: String,
///         #[persist(setter = set_mayor)]
///         mayor: Option<Resident>,
///         #[persist(rename = "outpostSpawns")]
///         outpost_spawns: Vec<Location>,
///     }
/// }
/// ```
///
/// Fields of `extends` ancestors come first, in declaration order. A
/// `setter` names an inherent `fn(&mut Self, T) -> Result<()>` that load
/// calls instead of assigning the field.
#[macro_export]
macro_rules! persist_object {
    (
        $name:ident $(extends $($base:ident : $base_ty:ty),+)? {
            $($(#[$($field_meta:tt)*])* $field:ident : $field_ty:ty),* $(,)?
        }
    ) => {
        impl $crate::persist::PersistObject for $name {
            fn fields() -> &'static $crate::persist::FieldTable<Self> {
                static FIELDS: ::std::sync::OnceLock<$crate::persist::FieldTable<$name>> =
                    ::std::sync::OnceLock::new();

                FIELDS.get_or_init(|| {
                    #[allow(unused_mut)]
                    let mut table = $crate::persist::FieldTable::<$name>::new();
                    $($(
                        {
                            fn get(object: &$name) -> &$base_ty {
                                &object.$base
                            }
                            fn get_mut(object: &mut $name) -> &mut $base_ty {
                                &mut object.$base
                            }
                            table.extend(
                                <$base_ty as $crate::persist::PersistObject>::fields(),
                                get,
                                get_mut,
                            );
                        }
                    )+)?
                    $(
                        {
                            fn get(object: &$name) -> &$field_ty {
                                &object.$field
                            }
                            fn get_mut(object: &mut $name) -> &mut $field_ty {
                                &mut object.$field
                            }
                            let field = $crate::persist::SlotField::<$name, $field_ty>::new(
                                $crate::__persist_field_name!(
                                    ::std::stringify!($field); $(#[$($field_meta)*])*
                                ),
                                get,
                                get_mut,
                            );
                            table.push($crate::__persist_field_setter!(
                                $name, field; $(#[$($field_meta)*])*
                            ));
                        }
                    )*
                    table
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{PersistError, Result};
    use crate::domain::Resident;
    use crate::persist::{Persist, PersistObject, TypeDescriptor};

    #[derive(Default)]
    struct Named {
        name: String,
    }

    crate::persist_object! {
        Named {
            name: String,
        }
    }

    #[derive(Default)]
    struct Town {
        base: Named,
        mayor: Option<Resident>,
        outpost_spawns: Vec<String>,
        bonus: i32,
        mayor_changes: usize,
    }

    impl Town {
        fn set_mayor(&mut self, mayor: Resident) -> Result<()> {
            if mayor.name == "nobody" {
                return Err(PersistError::field_access("mayor", "not a resident"));
            }
            self.mayor_changes += 1;
            self.mayor = Some(mayor);
            Ok(())
        }
    }

    crate::persist_object! {
        Town extends base: Named {
            #[persist(setter = set_mayor)]
            mayor: Option<Resident>,
            #[persist(rename = "outpostSpawns")]
            outpost_spawns: Vec<String>,
            /// Extra claimable blocks.
            #[persist(rename = "bonusBlocks", setter = set_bonus)]
            bonus: i32,
        }
    }

    impl Town {
        fn set_bonus(&mut self, bonus: i32) -> Result<()> {
            self.bonus = bonus.max(0);
            Ok(())
        }
    }

    #[test]
    fn test_generated_table() {
        let fields = Town::fields();
        assert_eq!(fields.names(), vec!["name", "mayor", "outpostSpawns", "bonusBlocks"]);

        let mayor = fields.get("mayor").unwrap();
        assert_eq!(mayor.descriptor(), &TypeDescriptor::scalar::<Resident>());
        assert_eq!(mayor.setter_name(), Some("set_mayor"));

        let spawns = fields.get("outpostSpawns").unwrap();
        assert_eq!(spawns.descriptor(), &Vec::<String>::descriptor());
        assert_eq!(spawns.setter_name(), None);

        assert_eq!(fields.get("bonusBlocks").unwrap().setter_name(), Some("set_bonus"));
        assert!(std::ptr::eq(fields, Town::fields()));
    }

    #[test]
    fn test_generated_accessors() {
        let fields = Town::fields();
        let mut town = Town::default();

        fields
            .get("name")
            .unwrap()
            .store(&mut town, Box::new("Riverside".to_string()))
            .unwrap();
        assert_eq!(town.base.name, "Riverside");

        let mayor = fields.get("mayor").unwrap();
        mayor.store(&mut town, Box::new(Resident::new("Alice"))).unwrap();
        assert_eq!(town.mayor_changes, 1);
        assert!(mayor.store(&mut town, Box::new(Resident::new("nobody"))).is_err());
        assert_eq!(town.mayor.as_ref().map(|m| m.name.as_str()), Some("Alice"));

        fields
            .get("bonusBlocks")
            .unwrap()
            .store(&mut town, Box::new(-5i32))
            .unwrap();
        assert_eq!(town.bonus, 0);
    }
}
