use syn::{Attribute, Error, ExprPath, LitStr, Token};

pub enum DefaultDefinition {
    Default,
    Expr(ExprPath),
}

#[derive(Default)]
pub struct FieldAttributes {
    pub default: Option<DefaultDefinition>,
    pub name: Option<LitStr>,
    pub injector: bool,
}

impl TryFrom<&Attribute> for FieldAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self, Self::Error> {
        let mut attributes = Self::default();
        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                if meta.input.peek(Token![=]) {
                    let value = meta.value()?;
                    let expr: LitStr = value.parse()?;
                    attributes.default = Some(DefaultDefinition::Expr(expr.parse()?));
                } else {
                    attributes.default = Some(DefaultDefinition::Default);
                }
            } else if meta.path.is_ident("name") {
                attributes.name = Some(meta.value().and_then(|value| value.parse())?);
            } else if meta.path.is_ident("injector") {
                attributes.injector = true;
            } else {
                return Err(meta.error("unsupported inject attribute"));
            }

            Ok(())
        })?;

        if attributes.default.is_some() && (attributes.name.is_some() || attributes.injector) {
            return Err(Error::new_spanned(
                value,
                "Default fields are not injected and cannot have a dependency name!",
            ));
        }

        if attributes.name.is_some() && attributes.injector {
            return Err(Error::new_spanned(
                value,
                "The injector is always injected under a reserved name!",
            ));
        }

        Ok(attributes)
    }
}
