//! torch 封装

pub mod tensor;
