use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// PROJ release number.
///
/// Serialized as the dotted string (`"9.1.0"`) so snapshots stay readable.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Release assumed when the library exposes no way to ask.
    pub const BASELINE: Version = Version::new(4, 9, 0);

    /// A version from its three components.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `"major.minor[.patch]"`. Anything after the third component is
    /// ignored (`"9.4.0-rc1"` parses as 9.4.0).
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('.');
        let major = leading_number(parts.next()?)?;
        let minor = leading_number(parts.next()?)?;
        let patch = match parts.next() {
            Some(part) => leading_number(part).unwrap_or(0),
            None => 0,
        };
        Some(Self::new(major, minor, patch))
    }

    /// Extract the version from a 4.x release banner such as
    /// `"Rel. 4.9.3, 15 August 2016"`.
    pub fn parse_release(release: &str) -> Option<Self> {
        release
            .split(|c: char| !(c.is_ascii_digit() || c == '.'))
            .filter(|token| token.contains('.'))
            .find_map(|token| Self::parse(token.trim_matches('.')))
    }
}

fn leading_number(part: &str) -> Option<u32> {
    let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Version::parse(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid PROJ version '{value}'")))
    }
}

macro_rules! capabilities {
    ($($variant:ident => $symbol:literal since ($major:literal, $minor:literal);)*) => {
        /// A version-gated PROJ entry point.
        ///
        /// Each variant names exactly one C symbol and the release that
        /// introduced it.
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub enum Capability {
            $($variant,)*
        }

        impl Capability {
            pub const ALL: &'static [Capability] = &[$(Capability::$variant,)*];

            /// The C symbol this capability gates.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Capability::$variant => $symbol,)*
                }
            }

            /// First PROJ release that exports this symbol.
            pub fn introduced_in(self) -> Version {
                match self {
                    $(Capability::$variant => Version::new($major, $minor, 0),)*
                }
            }

            /// Look a capability up by its C symbol name.
            pub fn from_symbol(symbol: &str) -> Option<Self> {
                match symbol {
                    $($symbol => Some(Capability::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

capabilities! {
    PjGetRelease => "pj_get_release" since (4, 9);
    PjStrerrno => "pj_strerrno" since (4, 9);

    Info => "proj_info" since (5, 0);
    PjInfo => "proj_pj_info" since (5, 0);
    ContextCreate => "proj_context_create" since (5, 0);
    ContextDestroy => "proj_context_destroy" since (5, 0);
    ContextErrno => "proj_context_errno" since (5, 0);
    Errno => "proj_errno" since (5, 0);
    ErrnoReset => "proj_errno_reset" since (5, 0);
    Create => "proj_create" since (5, 0);
    CreateArgv => "proj_create_argv" since (5, 0);
    CreateCrsToCrs => "proj_create_crs_to_crs" since (5, 0);
    Destroy => "proj_destroy" since (5, 0);
    Trans => "proj_trans" since (5, 0);

    ErrnoString => "proj_errno_string" since (5, 1);
    LogLevel => "proj_log_level" since (5, 1);
    LogFunc => "proj_log_func" since (5, 1);

    Clone => "proj_clone" since (6, 0);
    GetName => "proj_get_name" since (6, 0);
    GetIdAuthName => "proj_get_id_auth_name" since (6, 0);
    GetIdCode => "proj_get_id_code" since (6, 0);
    GetRemarks => "proj_get_remarks" since (6, 0);
    GetScope => "proj_get_scope" since (6, 0);
    GetType => "proj_get_type" since (6, 0);
    IsCrs => "proj_is_crs" since (6, 0);
    IsEquivalentTo => "proj_is_equivalent_to" since (6, 0);
    IsDeprecated => "proj_is_deprecated" since (6, 0);
    GetAreaOfUse => "proj_get_area_of_use" since (6, 0);
    AsWkt => "proj_as_wkt" since (6, 0);
    AsProjString => "proj_as_proj_string" since (6, 0);
    ContextSetDatabasePath => "proj_context_set_database_path" since (6, 0);
    ContextGetDatabasePath => "proj_context_get_database_path" since (6, 0);
    ContextUseProj4InitRules => "proj_context_use_proj4_init_rules" since (6, 0);
    ContextGetUseProj4InitRules => "proj_context_get_use_proj4_init_rules" since (6, 0);
    CrsGetGeodeticCrs => "proj_crs_get_geodetic_crs" since (6, 0);
    CrsGetHorizontalDatum => "proj_crs_get_horizontal_datum" since (6, 0);
    CrsGetSubCrs => "proj_crs_get_sub_crs" since (6, 0);
    CrsGetDatum => "proj_crs_get_datum" since (6, 0);
    CrsGetCoordinateSystem => "proj_crs_get_coordinate_system" since (6, 0);
    CsGetType => "proj_cs_get_type" since (6, 0);
    CsGetAxisCount => "proj_cs_get_axis_count" since (6, 0);
    CsGetAxisInfo => "proj_cs_get_axis_info" since (6, 0);
    CrsGetCoordoperation => "proj_crs_get_coordoperation" since (6, 0);
    CoordoperationGetAccuracy => "proj_coordoperation_get_accuracy" since (6, 0);
    CoordoperationGetMethodInfo => "proj_coordoperation_get_method_info" since (6, 0);
    GetEllipsoid => "proj_get_ellipsoid" since (6, 0);
    EllipsoidGetParameters => "proj_ellipsoid_get_parameters" since (6, 0);
    GetPrimeMeridian => "proj_get_prime_meridian" since (6, 0);
    PrimeMeridianGetParameters => "proj_prime_meridian_get_parameters" since (6, 0);

    AsProjjson => "proj_as_projjson" since (6, 2);
    CreateCrsToCrsFromPj => "proj_create_crs_to_crs_from_pj" since (6, 2);
    Cleanup => "proj_cleanup" since (6, 2);

    CoordoperationIsInstantiable => "proj_coordoperation_is_instantiable" since (7, 1);

    ContextErrnoString => "proj_context_errno_string" since (8, 0);
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Capability::from_symbol(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown PROJ capability '{value}'")))
    }
}
