use syn::spanned::Spanned;
use syn::{Attribute, Error, Expr, ExprArray, ExprLit, ExprPath, Lit, LitStr, Token};

pub const INSPECTABLE: &str = "inspectable";

pub enum DefaultDefinition {
    Default,
    Expr(ExprPath),
}

/// Configuration of struct fields and method parameters.
pub struct ParameterAttributes {
    pub default: Option<DefaultDefinition>,
}

impl TryFrom<&Attribute> for ParameterAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self, Self::Error> {
        let mut default = None;
        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                if meta.input.peek(Token![=]) {
                    let value = meta.value()?;
                    let expr: LitStr = value.parse()?;
                    default = Some(DefaultDefinition::Expr(expr.parse()?));
                } else {
                    default = Some(DefaultDefinition::Default);
                }

                Ok(())
            } else {
                Err(meta.error("Unsupported parameter attribute!"))
            }
        })?;

        Ok(Self { default })
    }
}

/// Configuration of types and methods.
#[derive(Default)]
pub struct DeclarationAttributes {
    pub markers: Vec<LitStr>,
    /// Fallible constructor function, only allowed on types.
    pub constructor: Option<ExprPath>,
}

impl TryFrom<&Attribute> for DeclarationAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self, Self::Error> {
        let mut markers = vec![];
        let mut constructor = None;
        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("markers") {
                let array: ExprArray = meta.value()?.parse()?;
                for elem in array.elems {
                    if let Expr::Lit(ExprLit {
                        lit: Lit::Str(marker),
                        ..
                    }) = elem
                    {
                        markers.push(marker);
                    } else {
                        return Err(Error::new(elem.span(), "Markers need to be strings!"));
                    }
                }

                Ok(())
            } else if meta.path.is_ident("constructor") {
                let path: LitStr = meta.value()?.parse()?;
                constructor = Some(path.parse()?);
                Ok(())
            } else {
                Err(meta.error("Unsupported declaration attribute!"))
            }
        })?;

        Ok(Self {
            markers,
            constructor,
        })
    }
}

pub fn is_inspectable(attribute: &Attribute) -> bool {
    attribute.path().is_ident(INSPECTABLE)
}

pub fn extract_parameter_attributes(
    attributes: &[Attribute],
) -> Result<Option<ParameterAttributes>, Error> {
    attributes
        .iter()
        .find(|attribute| is_inspectable(attribute))
        .map(ParameterAttributes::try_from)
        .transpose()
}

pub fn extract_declaration_attributes(
    attributes: &[Attribute],
) -> Result<DeclarationAttributes, Error> {
    attributes
        .iter()
        .find(|attribute| is_inspectable(attribute))
        .map(DeclarationAttributes::try_from)
        .transpose()
        .map(Option::unwrap_or_default)
}
