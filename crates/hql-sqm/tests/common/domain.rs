//! The domain model queries in these tests run against

use hql_model::{
    BasicType, ClassHandle, CompositeDescriptor, EntityDescriptor, MetamodelConfig,
    StaticMetamodel, ValueType,
};

fn config() -> MetamodelConfig {
    MetamodelConfig::default()
        .with_entity(
            EntityDescriptor::new("Something")
                .with_attribute("basic", ValueType::basic(BasicType::String))
                .with_attribute("basic1", ValueType::basic(BasicType::Integer))
                .with_attribute("basic2", ValueType::basic(BasicType::Long))
                .with_attribute("other", ValueType::entity("SomethingElse")),
        )
        .with_entity(
            EntityDescriptor::new("SomethingElse")
                .with_attribute("basic", ValueType::basic(BasicType::String))
                .with_attribute("basic1", ValueType::basic(BasicType::Integer)),
        )
        .with_entity(
            EntityDescriptor::new("Anything")
                .with_attribute("basic", ValueType::basic(BasicType::String))
                .with_attribute("basic1", ValueType::basic(BasicType::Integer))
                .with_attribute("basic2", ValueType::basic(BasicType::Long)),
        )
        .with_entity(
            EntityDescriptor::new("Person")
                .with_attribute("name", ValueType::basic(BasicType::String))
                .with_attribute("age", ValueType::basic(BasicType::Integer))
                .with_attribute("salary", ValueType::basic(BasicType::BigDecimal))
                .with_attribute("address", ValueType::composite("Address"))
                .with_attribute("pets", ValueType::list(ValueType::entity("Cat")))
                .with_attribute(
                    "nicknames",
                    ValueType::map(
                        ValueType::basic(BasicType::String),
                        ValueType::basic(BasicType::String),
                    ),
                )
                .with_attribute("tags", ValueType::set(ValueType::basic(BasicType::String)))
                .with_attribute("manager", ValueType::entity("Person")),
        )
        .with_composite(
            CompositeDescriptor::new("Address")
                .with_attribute("city", ValueType::basic(BasicType::String))
                .with_attribute("zip", ValueType::basic(BasicType::String)),
        )
        .with_entity(
            EntityDescriptor::new("Order")
                .with_attribute("number", ValueType::basic(BasicType::Long))
                .with_attribute("items", ValueType::list(ValueType::entity("Item"))),
        )
        .with_entity(
            EntityDescriptor::new("Item")
                .with_attribute("name", ValueType::basic(BasicType::String))
                .with_attribute("price", ValueType::basic(BasicType::Double))
                .with_attribute("quantity", ValueType::basic(BasicType::Integer)),
        )
        .with_entity(
            EntityDescriptor::new("Cat")
                .with_attribute("name", ValueType::basic(BasicType::String))
                .with_attribute("lives", ValueType::basic(BasicType::Integer)),
        )
        .with_entity(
            EntityDescriptor::new("Dog")
                .with_attribute("name", ValueType::basic(BasicType::String))
                .with_attribute("breed", ValueType::basic(BasicType::String)),
        )
        .with_polymorphic("Animal", ["Cat", "Dog"])
        .with_class(ClassHandle::enumeration(
            "com.acme.Status",
            ["ACTIVE", "RETIRED"],
        ))
        .with_class(ClassHandle::class("com.acme.Limits").with_constant("MAX", BasicType::Long))
        .with_class(ClassHandle::class("com.acme.PersonDto"))
}

/// The lenient model; HQL extensions are accepted
pub fn model() -> StaticMetamodel {
    StaticMetamodel::from_config(config()).expect("valid test model")
}

/// The same model with strict JPQL compliance
pub fn strict_model() -> StaticMetamodel {
    StaticMetamodel::from_config(config().with_strict_jpa_compliance(true))
        .expect("valid test model")
}
