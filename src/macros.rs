macro_rules! impl_to_perf_string_on_to_string {
    ($($t:ty), *) => {
        $(
            impl ToPerfString for $t {
                fn to_perf_string(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

/// Joins a label and its perf fields into `label=a;b;c`, dropping trailing empty fields.
macro_rules! perf_string {
    ($label:expr, $( $tps:expr), *) => {
        {
            let mut s = String::new();
            s.push_str(&format!("{}=", $label));
            $(
                s.push_str(&$tps.to_perf_string());
                s.push(';');
            )*
            s.trim_end_matches(';').to_string()
        }
    };
}

/// Declares the `MetricId` enum together with everything known about each SNMP object:
/// its object name in the StorSafe MIB, the label used in status lines, the performance data
/// label, the unit and the metric kind.
///
/// ```ignore
/// define_metrics! {
///     UsedCachePercent => ("cacheUsedPercent.0", "Used cache", "used_cache_percent", Percentage, Percentage),
/// }
/// ```
macro_rules! define_metrics {
    ($( $(#[$meta:meta])* $id:ident => ($object:expr, $label:expr, $perf:expr, $unit:ident, $kind:ident) ),* $(,)?) => {
        /// Every SNMP object the plugin knows how to query.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum MetricId {
            $( $(#[$meta])* $id, )*
        }

        impl MetricId {
            pub const ALL: &'static [MetricId] = &[ $( MetricId::$id, )* ];

            /// Object name relative to the StorSafe MIB module, e.g. `cacheUsedPercent.0`.
            pub fn object_name(&self) -> &'static str {
                match self {
                    $( MetricId::$id => $object, )*
                }
            }

            /// Human readable label used in status lines.
            pub fn label(&self) -> &'static str {
                match self {
                    $( MetricId::$id => $label, )*
                }
            }

            /// Label used in the performance data part of the output.
            pub fn perf_label(&self) -> &'static str {
                match self {
                    $( MetricId::$id => $perf, )*
                }
            }

            pub fn unit(&self) -> $crate::Unit {
                match self {
                    $( MetricId::$id => $crate::Unit::$unit, )*
                }
            }

            pub fn kind(&self) -> $crate::metric::MetricKind {
                match self {
                    $( MetricId::$id => $crate::metric::MetricKind::$kind, )*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::ToPerfString;

    #[test]
    fn test_perf_string_macro() {
        let value = 1.5_f64;
        let warning: Option<f64> = Some(2.0);
        let critical: Option<f64> = Some(3.0);
        let none: Option<f64> = None;
        assert_eq!(perf_string!("a", value, warning, critical), "a=1.5;2;3");
        assert_eq!(perf_string!("a", value, none, none), "a=1.5");
        assert_eq!(perf_string!("a", value, none, critical), "a=1.5;;3");
    }
}
