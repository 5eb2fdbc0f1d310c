//! 总评与等级计算
//!
//! 分数先按最短十进制表示转换为 `Decimal`，均值和舍入都在十进制下完成，
//! 避免 `0.145` 这类在二进制中略小于中点的值被舍掉。

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::{Result, SiakadError};
use crate::models::grades::entities::{GRADE_FLOORS, LetterGrade};

/// 四舍五入（half-up）到小数点后两位，`.xx5` 一律远离零进位
pub fn round_half_up_2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn to_decimal(field: &str, score: f64) -> Result<Decimal> {
    Decimal::from_f64(score)
        .ok_or_else(|| SiakadError::validation(format!("{field} is out of range: {score}")))
}

fn letter_for(mean: Decimal) -> LetterGrade {
    GRADE_FLOORS
        .iter()
        .find(|(_, floor)| mean >= Decimal::from(*floor))
        .map_or(LetterGrade::E, |(grade, _)| *grade)
}

/// 由三项成绩计算总评与等级
///
/// 总评为三项平均分取两位小数，等级由未取整的平均分决定。
/// 无法用十进制表示的分数（如 `1e308`）返回校验错误。
pub fn compute_derived(
    assignments: f64,
    midterm: f64,
    final_exam: f64,
) -> Result<(f64, LetterGrade)> {
    let sum = [
        ("assignments", assignments),
        ("midterm", midterm),
        ("final", final_exam),
    ]
    .into_iter()
    .try_fold(Decimal::ZERO, |acc, (field, score)| {
        acc.checked_add(to_decimal(field, score)?)
            .ok_or_else(|| SiakadError::validation("sum of scores is out of range"))
    })?;

    let mean = sum / Decimal::from(3);
    let total = round_half_up_2(mean)
        .to_f64()
        .ok_or_else(|| SiakadError::validation(format!("total is out of range: {mean}")))?;

    Ok((total, letter_for(mean)))
}
