//! 文件夹路径
//!
//! 宿主 `folder_paths` 模块的封装, 路径配置以宿主为准

use std::{collections::BTreeSet, path::PathBuf};

use log::warn;
use pyo3::{
    types::{PyAnyMethods, PyModule},
    Bound, PyAny, Python,
};

use crate::error::Error;

/// 宿主文件夹路径
pub struct FolderPaths<'py> {
    module: Bound<'py, PyAny>,
}

impl<'py> FolderPaths<'py> {
    pub fn new(py: Python<'py>) -> Result<Self, Error> {
        let module = PyModule::import(py, "folder_paths")?.into_any();
        Ok(Self { module })
    }

    /// 获取输出目录
    pub fn output_directory(&self) -> Result<PathBuf, Error> {
        let dir: String = self
            .module
            .call_method0("get_output_directory")?
            .extract()?;
        Ok(PathBuf::from(dir))
    }

    /// 获取文件名列表
    pub fn get_filename_list(&self, folder_name: &str) -> Result<Vec<String>, Error> {
        let files: Vec<String> = self
            .module
            .call_method1("get_filename_list", (folder_name,))?
            .extract()?;
        Ok(files)
    }

    /// 合并多个文件夹的文件名列表
    ///
    /// 去重并排序, 不存在的文件夹会被忽略
    pub fn merged_filename_list(&self, folder_names: &[&str]) -> Vec<String> {
        let mut files = BTreeSet::new();
        for folder_name in folder_names {
            match self.get_filename_list(folder_name) {
                Ok(list) => files.extend(list),
                Err(e) => warn!("skip model folder {folder_name}, {e}"),
            }
        }
        files.into_iter().collect()
    }
}
