//! 配置段使用的宏

/// 用字段默认值生成 `Default` 实现
///
/// 配置的各个段（窗口、模拟、渲染、Bloom）都用它声明默认值，
/// 和 `#[serde(default)]` 配合，缺省的字段回落到这里。
///
/// ```ignore
/// impl_default!(BloomConfig {
///     iterations: 9,
///     intensity: 1.0,
/// });
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    struct Extent {
        width: u32,
        label: String,
    }

    impl_default!(Extent {
        width: 4,
        label: "bloom_0".to_string(),
    });

    #[test]
    fn test_impl_default() {
        let e = Extent::default();
        assert_eq!(e.width, 4);
        assert_eq!(e.label, "bloom_0");
    }
}
