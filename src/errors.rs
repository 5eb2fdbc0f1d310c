//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_siakad_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum SiakadError {
            $($variant(String),)*
        }

        impl SiakadError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(SiakadError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(SiakadError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(SiakadError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl SiakadError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        SiakadError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_siakad_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    Validation("E004", "Validation Error"),
    EmptyBatch("E005", "Empty Batch"),
    NotFound("E006", "Resource Not Found"),
    Conflict("E007", "Resource Conflict"),
    Authentication("E008", "Authentication Error"),
    Authorization("E009", "Authorization Error"),
}

impl SiakadError {
    /// 请求参数不合法，调用在写入前被拒绝
    pub fn is_validation(&self) -> bool {
        matches!(self, SiakadError::Validation(_) | SiakadError::EmptyBatch(_))
    }

    /// 存储后端不可达或拒绝写入
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            SiakadError::DatabaseConnection(_) | SiakadError::DatabaseOperation(_)
        )
    }
}

impl SiakadError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SiakadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SiakadError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for SiakadError {
    fn from(err: sea_orm::DbErr) -> Self {
        SiakadError::DatabaseOperation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SiakadError>;
