//! 区间采样器
//!
//! 提供带种子的确定性随机源，在闭区间 `[low, high]` 内均匀采样。
//! 相同种子 + 相同调用序列 => 相同结果，用于可复现的发射测试。

use bevy_ecs::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// 闭区间 `[min, max]`
///
/// `min > max` 的区间在采样时会被交换处理，不视为错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarRange2<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> ScalarRange2<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// 退化区间（常量）
    pub const fn constant(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// 返回 `min <= max` 的规范形式
    pub fn normalized(self) -> Self {
        if self.min > self.max {
            Self {
                min: self.max,
                max: self.min,
            }
        } else {
            self
        }
    }

    /// 值是否落在区间内（含端点）
    pub fn contains(&self, value: T) -> bool {
        let n = self.normalized();
        value >= n.min && value <= n.max
    }
}

impl<T: PartialOrd + Copy> From<(T, T)> for ScalarRange2<T> {
    fn from((min, max): (T, T)) -> Self {
        Self::new(min, max)
    }
}

impl<T: PartialOrd + Copy + Default> Default for ScalarRange2<T> {
    fn default() -> Self {
        Self::constant(T::default())
    }
}

/// 可以在闭区间内采样的数值类型
///
/// 调用时保证 `low <= high`。
pub trait RangeValue: PartialOrd + Copy {
    fn sample_between<R: Rng>(rng: &mut R, low: Self, high: Self) -> Self;
}

macro_rules! impl_range_value_int {
    ($($t:ty),*) => {
        $(
            impl RangeValue for $t {
                fn sample_between<R: Rng>(rng: &mut R, low: Self, high: Self) -> Self {
                    rng.gen_range(low..=high)
                }
            }
        )*
    };
}

impl_range_value_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

// 浮点区间按 `low + width * t` 插值，宽度溢出或端点为无穷时返回 `low`
macro_rules! impl_range_value_float {
    ($($t:ty),*) => {
        $(
            impl RangeValue for $t {
                fn sample_between<R: Rng>(rng: &mut R, low: Self, high: Self) -> Self {
                    let width = f64::from(high) - f64::from(low);
                    if !width.is_finite() {
                        return low;
                    }
                    let t: f64 = rng.gen_range(0.0..=1.0);
                    ((f64::from(low) + width * t) as $t).clamp(low, high)
                }
            }
        )*
    };
}

impl_range_value_float!(f32, f64);

/// 带种子的随机源（ECS 资源）
///
/// 作为显式上下文对象传入发射系统，不使用全局单例。
#[derive(Resource, Debug, Clone)]
pub struct RangeSampler {
    seed: u64,
    rng: StdRng,
}

impl RangeSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// 在闭区间 `[low, high]` 内均匀采样
    ///
    /// 整数区间包含两个端点；`low > high` 时交换。任何输入都不会 panic。
    pub fn sample<T: RangeValue>(&mut self, low: T, high: T) -> T {
        let (low, high) = if low > high { (high, low) } else { (low, high) };
        // NaN 端点无法比较
        if !(low <= high) {
            return low;
        }
        T::sample_between(&mut self.rng, low, high)
    }

    /// 从区间采样
    pub fn range<T: RangeValue>(&mut self, range: &ScalarRange2<T>) -> T {
        self.sample(range.min, range.max)
    }

    /// `[0, 1]` 内的浮点数
    pub fn zero_to_one(&mut self) -> f32 {
        self.sample(0.0, 1.0)
    }
}

impl Default for RangeSampler {
    fn default() -> Self {
        Self::new(42)
    }
}
