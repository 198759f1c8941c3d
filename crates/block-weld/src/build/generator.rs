//! BlocklyGenerator for one host action set
//!
//! Runs the extractor once and feeds the same block specs and the same
//! defaults registry to every emitter.

use crate::build::toolbox::{update_toolbox_file, ToolboxError};
use crate::build::verify::{module_specifier, verify_module, VerifyError};
use crate::build::write::write_all_atomic;
use crate::codegen::{
    BlockDefinitionGenerator, CallCodeGenerator, CategoryFragment, CodegenError, DefaultsRegistry,
};
use crate::config::GeneratorConfig;
use crate::ir::{extract_blocks, ActionSet, BlockSpec, HostActions, Resolver, ValidationError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during generation
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Invalid block annotations
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Call code could not be generated
    #[error("Code generation error: {0}")]
    Codegen(#[from] CodegenError),

    /// A generated module does not parse
    #[error("Verification error: {0}")]
    Verify(#[from] VerifyError),

    /// Toolbox merge failed
    #[error("Toolbox error: {0}")]
    Toolbox(#[from] ToolboxError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Generator for the Blockly artifacts of one host action set
///
/// # Example
/// ```ignore
/// use block_weld::build::BlocklyGenerator;
///
/// let output = BlocklyGenerator::for_actions::<MockActions>()
///     .category_name("Robot Control")
///     .generate()?;
/// output.write_modules("blocks", "generators", true)?;
/// output.update_toolbox("toolbox.xml")?;
/// ```
#[derive(Debug, Clone)]
pub struct BlocklyGenerator {
    host: HostActions,
    config: GeneratorConfig,
}

impl BlocklyGenerator {
    /// Create a generator for a described host action set
    pub fn new(host: HostActions) -> Self {
        Self {
            host,
            config: GeneratorConfig::default(),
        }
    }

    /// Create a generator for a type implementing [`ActionSet`]
    pub fn for_actions<A: ActionSet>() -> Self {
        Self::new(A::host_actions())
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Map a source type to a check type
    pub fn type_map(mut self, source: impl Into<String>, check: impl Into<String>) -> Self {
        self.config.type_map.insert(source.into(), check.into());
        self
    }

    /// Set the shadow markup of a domain type
    pub fn shadow_map(mut self, source: impl Into<String>, markup: impl Into<String>) -> Self {
        self.config.shadow_map.insert(source.into(), markup.into());
        self
    }

    /// Set the palette category name
    pub fn category_name(mut self, name: impl Into<String>) -> Self {
        self.config.category_name = Some(name.into());
        self
    }

    /// Set the palette category colour
    pub fn category_colour(mut self, colour: impl Into<String>) -> Self {
        self.config.category_colour = Some(colour.into());
        self
    }

    /// Set the block id prefix
    pub fn block_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.block_prefix = Some(prefix.into());
        self
    }

    /// The host action set
    pub fn host(&self) -> &HostActions {
        &self.host
    }

    /// The configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Derive the block specs
    pub fn block_specs(&self) -> Result<Vec<BlockSpec>, ValidationError> {
        extract_blocks(&self.host, &Resolver::from_config(&self.config), &self.config)
    }

    /// Generate every artifact in memory
    pub fn generate(&self) -> Result<GeneratedOutput, GeneratorError> {
        let blocks = self.block_specs()?;

        let mut defaults = DefaultsRegistry::new();
        let block_gen = BlockDefinitionGenerator::new(&self.config);
        let block_definitions: Vec<String> = blocks
            .iter()
            .map(|block| block_gen.generate(block, &mut defaults))
            .collect();

        let call_gen = CallCodeGenerator::new(&self.config);
        let call_code = blocks
            .iter()
            .map(|block| call_gen.generate(block, &defaults))
            .collect::<Result<Vec<_>, _>>()?;

        let category = CategoryFragment::from_blocks(
            self.config
                .category_name
                .clone()
                .unwrap_or_else(|| self.host.display_name()),
            self.config.category_colour(),
            &blocks,
        );

        let blocks_module = block_gen.generate_module(&self.host.name, &block_definitions);
        let generators_module = call_gen.generate_module(&self.host.name, &call_code);

        tracing::debug!(
            host = %self.host.name,
            blocks = blocks.len(),
            "generated Blockly artifacts"
        );

        Ok(GeneratedOutput {
            host_name: self.host.name.clone(),
            blocks,
            defaults,
            block_definitions,
            call_code,
            category,
            blocks_module,
            generators_module,
        })
    }
}

/// Artifacts generated for one host action set
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    /// Host type name
    pub host_name: String,
    /// Block specs every artifact was generated from
    pub blocks: Vec<BlockSpec>,
    /// Defaults recorded by the block definition generator
    pub defaults: DefaultsRegistry,
    /// One `Blockly.Blocks[...]` definition per block
    pub block_definitions: Vec<String>,
    /// One `pythonGenerator.forBlock[...]` function per block
    pub call_code: Vec<String>,
    /// Toolbox category listing every block
    pub category: CategoryFragment,
    /// ES module registering the block definitions
    pub blocks_module: String,
    /// ES module registering the generator functions
    pub generators_module: String,
}

impl GeneratedOutput {
    /// Block ids in enumeration order
    pub fn block_ids(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.block_id.as_str()).collect()
    }

    /// All block definitions as one text
    pub fn block_definitions_text(&self) -> String {
        self.block_definitions.join("\n")
    }

    /// All generator functions as one text
    pub fn call_code_text(&self) -> String {
        self.call_code.join("\n")
    }

    /// The category fragment as XML
    pub fn toolbox_xml(&self) -> String {
        self.category.to_xml()
    }

    /// File name of both generated modules (e.g., "MockActions.mjs")
    pub fn module_file_name(&self) -> String {
        format!("{}.mjs", self.host_name)
    }

    /// Parse both modules
    pub fn verify(&self) -> Result<(), VerifyError> {
        let file_name = self.module_file_name();
        verify_module(&self.blocks_module, &module_specifier(&format!("blocks/{}", file_name)))?;
        verify_module(
            &self.generators_module,
            &module_specifier(&format!("generators/{}", file_name)),
        )?;
        Ok(())
    }

    /// Write both modules, returning their paths
    ///
    /// With `verify`, both modules are parsed before either is written.
    /// Both files are staged before either target is replaced.
    pub fn write_modules(
        &self,
        blocks_dir: impl AsRef<Path>,
        generators_dir: impl AsRef<Path>,
        verify: bool,
    ) -> Result<(PathBuf, PathBuf), GeneratorError> {
        if verify {
            self.verify()?;
        }

        let file_name = self.module_file_name();
        let blocks_path = blocks_dir.as_ref().join(&file_name);
        let generators_path = generators_dir.as_ref().join(&file_name);

        write_all_atomic(&[
            (blocks_path.as_path(), self.blocks_module.as_str()),
            (generators_path.as_path(), self.generators_module.as_str()),
        ])?;

        tracing::info!(
            blocks = %blocks_path.display(),
            generators = %generators_path.display(),
            "wrote modules for {}",
            self.host_name
        );
        Ok((blocks_path, generators_path))
    }

    /// Merge the category into the toolbox file at `path`
    pub fn update_toolbox(&self, path: impl AsRef<Path>) -> Result<(), ToolboxError> {
        update_toolbox_file(std::slice::from_ref(&self.category), path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ActionDescriptor, ActionType, BlockMeta, MethodParam, ParamMeta};

    fn mock_actions() -> HostActions {
        HostActions::new("MockActions")
            .action(
                ActionDescriptor::new("move")
                    .meta(BlockMeta::new("Move Robot"))
                    .param(MethodParam::new("speed").with_type(ActionType::Float).with_default(1.5))
                    .param(MethodParam::new("forward").with_type(ActionType::Bool).with_default(true)),
            )
            .action(
                ActionDescriptor::new("get_position")
                    .meta(BlockMeta::new("Get Position").with_output_type("3DVector"))
                    .param(MethodParam::new("target_id").with_type(ActionType::Int)),
            )
            .action(ActionDescriptor::new("internal_helper"))
    }

    #[test]
    fn test_generate() {
        let output = BlocklyGenerator::new(mock_actions()).generate().unwrap();

        assert_eq!(output.block_ids(), vec!["mock_actions_move", "mock_actions_get_position"]);
        assert_eq!(output.block_definitions.len(), 2);
        assert_eq!(output.call_code.len(), 2);
        assert_eq!(output.category.name, "Mock Actions");
        assert_eq!(output.category.colour, "65");
        assert!(output.toolbox_xml().starts_with("<category name=\"Mock Actions\""));
        assert!(output.toolbox_xml().ends_with("</category>"));
        assert!(!output.block_definitions_text().contains("internal_helper"));
        assert!(!output.call_code_text().contains("internal_helper"));
        assert_eq!(output.defaults.len(), 2);
    }

    #[test]
    fn test_category_overrides() {
        let output = BlocklyGenerator::new(mock_actions())
            .category_name("Robot Control")
            .category_colour("#FF0000")
            .generate()
            .unwrap();
        assert!(output
            .toolbox_xml()
            .starts_with("<category name=\"Robot Control\" colour=\"#FF0000\">"));
    }

    #[test]
    fn test_domain_type_mapping() {
        let host = HostActions::new("Builder").action(
            ActionDescriptor::new("place")
                .meta(BlockMeta::new("Place").param("origin", ParamMeta::new().with_label("At")))
                .param(MethodParam::new("origin").with_type(ActionType::named("Vec3"))),
        );
        let output = BlocklyGenerator::new(host)
            .shadow_map("Vec3", "<shadow type=\"vector_3d_zero\"></shadow>")
            .generate()
            .unwrap();

        let text = output.block_definitions_text();
        assert!(text.contains(".setCheck(\"3DVector\")"));
        assert!(text.contains("vector_3d_zero"));
        assert!(output.call_code_text().contains("|| \"Vec3(0,0,0)\";"));
    }

    #[test]
    fn test_validation_error_propagates() {
        let host = HostActions::new("MockActions")
            .action(ActionDescriptor::new("jump").meta(BlockMeta::unlabeled()));
        assert!(matches!(
            BlocklyGenerator::new(host).generate(),
            Err(GeneratorError::Validation(ValidationError::MissingLabel { .. }))
        ));
    }

    #[test]
    fn test_write_modules() {
        let dir = tempfile::tempdir().unwrap();
        let output = BlocklyGenerator::new(mock_actions()).generate().unwrap();

        let (blocks, generators) = output
            .write_modules(dir.path().join("blocks"), dir.path().join("generators"), true)
            .unwrap();

        assert!(blocks.ends_with("blocks/MockActions.mjs"));
        let text = std::fs::read_to_string(&generators).unwrap();
        assert!(text.contains("export function defineMockActionsGenerators(pythonGenerator) {"));
    }

    #[test]
    fn test_broken_module_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut output = BlocklyGenerator::new(mock_actions()).generate().unwrap();
        output.generators_module.push_str("export function (");

        let result = output.write_modules(dir.path().join("blocks"), dir.path().join("generators"), true);

        assert!(matches!(result, Err(GeneratorError::Verify(_))));
        assert!(!dir.path().join("blocks").exists());
    }

    #[test]
    fn test_unwritable_generators_dir_leaves_blocks_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let generators_dir = dir.path().join("generators");
        std::fs::write(&generators_dir, "").unwrap();
        let output = BlocklyGenerator::new(mock_actions()).generate().unwrap();

        let result = output.write_modules(dir.path().join("blocks"), &generators_dir, false);

        assert!(matches!(result, Err(GeneratorError::Io(_))));
        assert!(!dir.path().join("blocks/MockActions.mjs").exists());
    }
}
